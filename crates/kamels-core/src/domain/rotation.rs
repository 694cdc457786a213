//! Host rotation.
//!
//! Every host in the rotation runs KAMELS with the same host count and its
//! own 1-based position.  When a peripheral leaves this host it is sent to
//! the *next* host, whose zero-based slot is `position mod total`: position 1
//! of 3 sends to slot 1 (the second host), position 3 of 3 wraps to slot 0.

use thiserror::Error;

/// Smallest rotation worth switching in.
pub const MIN_HOSTS: u16 = 2;
/// Logitech multi-host peripherals pair with at most this many hosts.
pub const MAX_HOSTS: u16 = 4;

/// Error returned when rotation settings are unset or out of range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RotationError {
    #[error("total host count is not configured")]
    TotalHostsUnset,
    #[error("this host's position in the rotation is not configured")]
    PositionUnset,
    #[error("total host count {0} is outside {MIN_HOSTS}..={MAX_HOSTS}")]
    TotalHostsOutOfRange(u16),
    #[error("host position {position} is outside 1..={total_hosts}")]
    PositionOutOfRange { position: u16, total_hosts: u16 },
}

/// Validated rotation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationConfig {
    total_hosts: u16,
    this_host_position: u16,
}

impl RotationConfig {
    /// Validates raw settings values.  `0` means "not configured".
    ///
    /// # Errors
    ///
    /// Returns [`RotationError`] if either value is unset or out of range.
    pub fn new(total_hosts: u16, this_host_position: u16) -> Result<Self, RotationError> {
        if total_hosts == 0 {
            return Err(RotationError::TotalHostsUnset);
        }
        if this_host_position == 0 {
            return Err(RotationError::PositionUnset);
        }
        if !(MIN_HOSTS..=MAX_HOSTS).contains(&total_hosts) {
            return Err(RotationError::TotalHostsOutOfRange(total_hosts));
        }
        if this_host_position > total_hosts {
            return Err(RotationError::PositionOutOfRange {
                position: this_host_position,
                total_hosts,
            });
        }
        Ok(Self {
            total_hosts,
            this_host_position,
        })
    }

    pub fn total_hosts(&self) -> u16 {
        self.total_hosts
    }

    pub fn this_host_position(&self) -> u16 {
        self.this_host_position
    }

    /// Zero-based slot of the host peripherals are sent to from here.
    pub fn destination_slot(&self) -> u32 {
        u32::from(self.this_host_position % self.total_hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_position_wraps_to_slot_zero() {
        let rotation = RotationConfig::new(3, 3).unwrap();
        assert_eq!(rotation.destination_slot(), 0);
    }

    #[test]
    fn test_first_position_sends_to_slot_one() {
        let rotation = RotationConfig::new(3, 1).unwrap();
        assert_eq!(rotation.destination_slot(), 1);
    }

    #[test]
    fn test_two_host_rotation_alternates() {
        assert_eq!(RotationConfig::new(2, 1).unwrap().destination_slot(), 1);
        assert_eq!(RotationConfig::new(2, 2).unwrap().destination_slot(), 0);
    }

    #[test]
    fn test_slot_is_always_below_total() {
        for total in MIN_HOSTS..=MAX_HOSTS {
            for position in 1..=total {
                let slot = RotationConfig::new(total, position).unwrap().destination_slot();
                assert!(slot < u32::from(total), "slot {slot} for {position}/{total}");
            }
        }
    }

    #[test]
    fn test_unset_values_are_rejected() {
        assert_eq!(RotationConfig::new(0, 1), Err(RotationError::TotalHostsUnset));
        assert_eq!(RotationConfig::new(3, 0), Err(RotationError::PositionUnset));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert_eq!(
            RotationConfig::new(5, 1),
            Err(RotationError::TotalHostsOutOfRange(5))
        );
        assert_eq!(
            RotationConfig::new(1, 1),
            Err(RotationError::TotalHostsOutOfRange(1))
        );
        assert_eq!(
            RotationConfig::new(2, 3),
            Err(RotationError::PositionOutOfRange {
                position: 3,
                total_hosts: 2
            })
        );
    }
}
