use crate::model::trip::TimeSlot;

/// How far apart two slots may be for a room to still be relevant.
pub const PROXIMITY_TOLERANCE_MINUTES: i32 = 180;

const MINUTES_PER_DAY: i32 = 1440;
const HALF_DAY_MINUTES: i32 = 720;

/// Clock distance between two slots with midnight wraparound: 23:00 and
/// 01:00 are 120 minutes apart, not 1320.
pub fn slot_distance(a: TimeSlot, b: TimeSlot) -> i32 {
  let diff = (i32::from(a.minutes_of_day()) - i32::from(b.minutes_of_day())).abs();
  if diff > HALF_DAY_MINUTES {
    MINUTES_PER_DAY - diff
  } else {
    diff
  }
}

pub fn is_near(a: TimeSlot, b: TimeSlot, tolerance_minutes: i32) -> bool {
  slot_distance(a, b) <= tolerance_minutes
}

#[cfg(test)]
mod tests {
  use super::*;

  fn slot(value: &str) -> TimeSlot {
    TimeSlot::parse(value).unwrap()
  }

  #[test]
  fn wraps_around_midnight() {
    assert!(is_near(slot("23:00"), slot("01:00"), PROXIMITY_TOLERANCE_MINUTES));
    assert_eq!(slot_distance(slot("23:00"), slot("01:00")), 120);
    assert_eq!(slot_distance(slot("00:00"), slot("23:30")), 30);
  }

  #[test]
  fn rejects_beyond_tolerance() {
    // 270 minutes apart
    assert!(!is_near(slot("09:00"), slot("13:30"), PROXIMITY_TOLERANCE_MINUTES));
  }

  #[test]
  fn exact_tolerance_boundary() {
    assert!(is_near(slot("09:00"), slot("12:00"), 180));
    assert!(!is_near(slot("09:00"), slot("12:01"), 180));
  }

  #[test]
  fn is_symmetric() {
    let slots = ["00:00", "01:30", "09:00", "12:00", "13:30", "21:00", "23:30"];
    for a in slots {
      for b in slots {
        assert_eq!(
          is_near(slot(a), slot(b), PROXIMITY_TOLERANCE_MINUTES),
          is_near(slot(b), slot(a), PROXIMITY_TOLERANCE_MINUTES),
          "asymmetric for {} / {}", a, b
        );
      }
    }
  }

  #[test]
  fn same_slot_is_near() {
    assert!(is_near(slot("12:00"), slot("12:00"), 0));
  }

  #[test]
  fn distance_never_exceeds_half_day() {
    assert_eq!(slot_distance(slot("00:00"), slot("12:00")), 720);
    assert_eq!(slot_distance(slot("00:30"), slot("12:00")), 690);
  }
}
