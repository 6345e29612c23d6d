//! Helper utilities for common operations.

/// Current UNIX timestamp in seconds as the 32-bit value auction expiries use.
///
/// Returns 0 if the system clock is before the UNIX epoch and saturates at
/// `u32::MAX` past 2106.
pub fn current_timestamp() -> u32 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
		.unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_current_timestamp_is_recent() {
		// 2023-11-14
		assert!(current_timestamp() > 1_700_000_000);
	}
}
