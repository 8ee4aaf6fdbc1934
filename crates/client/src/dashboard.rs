use ulendo_core::models::user::Role;

/// Something a signed-in user can do from their dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    SearchSchedules,
    BookSeat,
    ViewBookings,
    CancelBooking,
    ShowTicket,
    PublishSchedule,
    ScanTicket,
    ViewProfile,
}

impl DashboardAction {
    /// Name of the CLI subcommand performing the action.
    pub fn command(&self) -> &'static str {
        match self {
            DashboardAction::SearchSchedules => "search",
            DashboardAction::BookSeat => "book",
            DashboardAction::ViewBookings => "bookings",
            DashboardAction::CancelBooking => "cancel",
            DashboardAction::ShowTicket => "ticket",
            DashboardAction::PublishSchedule => "publish",
            DashboardAction::ScanTicket => "scan",
            DashboardAction::ViewProfile => "whoami",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DashboardAction::SearchSchedules => "Search schedules",
            DashboardAction::BookSeat => "Book a seat",
            DashboardAction::ViewBookings => "My bookings",
            DashboardAction::CancelBooking => "Cancel a booking",
            DashboardAction::ShowTicket => "Show ticket",
            DashboardAction::PublishSchedule => "Publish a schedule",
            DashboardAction::ScanTicket => "Scan a ticket",
            DashboardAction::ViewProfile => "My profile",
        }
    }
}

/// The single dashboard shown to a role.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub role: Role,
    pub title: &'static str,
    pub actions: Vec<DashboardAction>,
}

impl Dashboard {
    pub fn for_role(role: Role) -> Self {
        use DashboardAction::*;

        let (title, actions) = match role {
            Role::Passenger => (
                "My Trips",
                vec![
                    SearchSchedules,
                    BookSeat,
                    ViewBookings,
                    CancelBooking,
                    ShowTicket,
                    ViewProfile,
                ],
            ),
            Role::Company => (
                "Company Dashboard",
                vec![SearchSchedules, PublishSchedule, ScanTicket, ViewProfile],
            ),
            Role::Conductor => ("Conductor Dashboard", vec![ScanTicket, ViewProfile]),
            Role::AccountsManager => (
                "Accounts Manager Dashboard",
                vec![SearchSchedules, ViewProfile],
            ),
            Role::Admin => (
                "Admin Dashboard",
                vec![SearchSchedules, PublishSchedule, ScanTicket, ViewProfile],
            ),
        };

        Self {
            role,
            title,
            actions,
        }
    }

    pub fn allows(&self, action: DashboardAction) -> bool {
        self.actions.contains(&action)
    }

    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.title);
        for action in &self.actions {
            out.push_str(&format!("  {:<10} {}\n", action.command(), action.label()));
        }
        out
    }
}
