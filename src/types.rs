// Custom types that are widely used are defined here.

// ID types.
pub type TeamId = u16;
pub type ConferenceId = u8;
pub type DivisionId = u8;
pub type GameId = u32;
pub type SeriesId = u16;

// Index of a calendar slot. Whether one slot is a day or a week depends on the cadence.
pub type Day = u16;

// Type conversions.
pub mod convert {
    use std::fmt::Display;

    // Convert between integers. Only for values the configuration checks or the id types already bound,
    // such as series counts of at most 15 rounds or indices below the largest team id. Panics otherwise.
    pub fn int<N1: Display + Copy, N2: TryFrom<N1>>(num: N1) -> N2 {
        match num.try_into() {
            Ok(n) => n,
            Err(_) => panic!("num: {num}")
        }
    }
}
