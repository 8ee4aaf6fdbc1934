use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use ulendo_core::models::booking::BookingStatus;
use uuid::Uuid;

use crate::models::{
    BookingInsert, DbBooking, DbSchedule, DbSession, DbUser, NewBooking, NewSchedule, NewUser,
    ScheduleFilter,
};
use crate::store::TicketStore;

// Mock store for handler tests that need to force storage outcomes
mock! {
    pub Store {}

    #[async_trait]
    impl TicketStore for Store {
        async fn create_user(&self, new_user: NewUser) -> eyre::Result<Option<DbUser>>;
        async fn get_user_by_email(&self, email: String) -> eyre::Result<Option<DbUser>>;
        async fn get_user_by_id(&self, id: Uuid) -> eyre::Result<Option<DbUser>>;

        async fn create_session(
            &self,
            user_id: Uuid,
            token: String,
            expires_at: DateTime<Utc>,
        ) -> eyre::Result<DbSession>;
        async fn get_session(&self, token: String) -> eyre::Result<Option<DbSession>>;
        async fn delete_session(&self, token: String) -> eyre::Result<()>;

        async fn create_schedule(&self, new_schedule: NewSchedule) -> eyre::Result<DbSchedule>;
        async fn get_schedule_by_id(&self, id: Uuid) -> eyre::Result<Option<DbSchedule>>;
        async fn search_schedules(&self, filter: ScheduleFilter) -> eyre::Result<Vec<DbSchedule>>;
        async fn get_booked_seats(&self, schedule_id: Uuid) -> eyre::Result<Vec<u32>>;

        async fn create_booking(&self, new_booking: NewBooking) -> eyre::Result<BookingInsert>;
        async fn get_booking_by_id(&self, id: Uuid) -> eyre::Result<Option<DbBooking>>;
        async fn get_booking_by_reference(&self, reference: String) -> eyre::Result<Option<DbBooking>>;
        async fn get_bookings_by_user(&self, user_id: Uuid) -> eyre::Result<Vec<DbBooking>>;
        async fn update_booking_status(
            &self,
            id: Uuid,
            from: BookingStatus,
            to: BookingStatus,
        ) -> eyre::Result<bool>;
        async fn mark_boarded(&self, id: Uuid, at: DateTime<Utc>) -> eyre::Result<bool>;
    }
}
