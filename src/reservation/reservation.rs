use std::fmt;
use chrono::NaiveDate;

/// A hotel booking held under its reservation code.
/// Check-out is not required to follow check-in; the dates are kept as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    hotel_name: String,
    room_number: u32,
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl Reservation {
    pub fn new(hotel_name: &str, room_number: u32, check_in: NaiveDate, check_out: NaiveDate) -> Reservation {
        Reservation {
            hotel_name: hotel_name.to_string(),
            room_number,
            check_in,
            check_out,
        }
    }

    pub fn hotel_name(&self) -> &str {
        &self.hotel_name
    }

    pub fn room_number(&self) -> u32 {
        self.room_number
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Days between check-in and check-out, negative if the dates are reversed
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reservation{{hotel_name='{}', room_number={}, check_in={}, check_out={}}}",
            self.hotel_name, self.room_number, self.check_in, self.check_out
        )
    }
}
