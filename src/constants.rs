/// Time slots available for play recommendations (1-hour windows, 7am to 10pm).
pub const TIME_SLOTS: [&str; 15] = [
    "07:00-08:00",
    "08:00-09:00",
    "09:00-10:00",
    "10:00-11:00",
    "11:00-12:00",
    "12:00-13:00",
    "13:00-14:00",
    "14:00-15:00",
    "15:00-16:00",
    "16:00-17:00",
    "17:00-18:00",
    "18:00-19:00",
    "19:00-20:00",
    "20:00-21:00",
    "21:00-22:00",
];

/// The home page summarizes sessions over the next two weeks.
pub const UPCOMING_WINDOW_DAYS: i64 = 14;

/// Upper bound on guests a member can bring to one session.
pub const MAX_GUESTS: i32 = 10;

#[must_use]
pub fn is_valid_time_slot(slot: &str) -> bool {
    TIME_SLOTS.contains(&slot)
}
