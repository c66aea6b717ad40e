use super::SlotClock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use types::Slot;

/// Determines the present slot based upon the present system time.
#[derive(Clone)]
pub struct SystemTimeSlotClock {
    genesis_slot: Slot,
    genesis_duration: Duration,
    slot_duration: Duration,
}

impl SystemTimeSlotClock {
    fn duration_since_unix_epoch() -> Option<Duration> {
        SystemTime::now().duration_since(UNIX_EPOCH).ok()
    }
}

impl SlotClock for SystemTimeSlotClock {
    fn new(genesis_slot: Slot, genesis_duration: Duration, slot_duration: Duration) -> Self {
        if slot_duration.as_millis() == 0 {
            panic!("SystemTimeSlotClock cannot have a < 1ms slot duration");
        }

        Self {
            genesis_slot,
            genesis_duration,
            slot_duration,
        }
    }

    fn now(&self) -> Option<Slot> {
        let now = Self::duration_since_unix_epoch()?;

        if now >= self.genesis_duration {
            let since_genesis = now.checked_sub(self.genesis_duration)?;
            let slot =
                Slot::from((since_genesis.as_millis() / self.slot_duration.as_millis()) as u64);
            Some(slot + self.genesis_slot)
        } else {
            None
        }
    }

    fn slot_duration(&self) -> Duration {
        self.slot_duration
    }

    fn duration_to_next_slot(&self) -> Option<Duration> {
        let now = Self::duration_since_unix_epoch()?;
        if now < self.genesis_duration {
            Some(self.genesis_duration - now)
        } else {
            let duration_into_slot =
                (now - self.genesis_duration).as_millis() % self.slot_duration.as_millis();
            Some(Duration::from_millis(
                (self.slot_duration.as_millis() - duration_into_slot) as u64,
            ))
        }
    }
}
