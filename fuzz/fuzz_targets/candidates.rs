#![no_main]
use chrono::{Datelike, Month, Weekday};
use date_decider_libs::poll::{CandidateSpec, MAX_CANDIDATES};
use libfuzzer_sys::fuzz_target;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fuzz_target!(|data: (i16, u8, u8, Vec<u8>, Vec<u8>)| {
    let (year, month, weekday_mask, include, exclude) = data;
    let month = match Month::try_from(month % 12 + 1) {
        Ok(month) => month,
        Err(_) => return,
    };

    let spec = CandidateSpec::new(year as i32, month)
        .with_weekdays(
            WEEKDAYS
                .iter()
                .enumerate()
                .filter(|(i, _)| weekday_mask & (1 << i) != 0)
                .map(|(_, &w)| w),
        )
        .with_include_days(include.into_iter().map(u32::from))
        .with_exclude_days(exclude.into_iter().map(u32::from));

    let days = spec.candidate_days();

    assert!(
        days.len() <= MAX_CANDIDATES,
        "Too many candidates: {}",
        days.len()
    );
    assert!(
        days.windows(2).all(|w| w[0] < w[1]),
        "Candidates are not strictly ascending: {:?}",
        days
    );
    for day in days {
        assert!(
            !spec.exclude_days.contains(&day.day()),
            "Excluded day {} offered",
            day
        );
        assert!(
            spec.weekdays.contains(&day.weekday()) || spec.include_days.contains(&day.day()),
            "{} matches no rule",
            day
        );
    }
});
