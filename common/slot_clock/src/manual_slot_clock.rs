use super::SlotClock;
use parking_lot::RwLock;
use std::time::Duration;
use types::Slot;

/// Determines the present slot from a manually-set "current" duration since genesis.
///
/// Used for testing and simulation: the pipeline observes exactly the ticks the test issues.
pub struct ManualSlotClock {
    genesis_slot: Slot,
    /// Duration from UNIX epoch to genesis.
    genesis_duration: Duration,
    /// Duration from UNIX epoch to the "present" instant.
    current_time: RwLock<Duration>,
    slot_duration: Duration,
}

impl Clone for ManualSlotClock {
    fn clone(&self) -> Self {
        ManualSlotClock {
            genesis_slot: self.genesis_slot,
            genesis_duration: self.genesis_duration,
            current_time: RwLock::new(*self.current_time.read()),
            slot_duration: self.slot_duration,
        }
    }
}

impl ManualSlotClock {
    /// Sets the "present" moment to the start of the given slot.
    pub fn set_slot(&self, slot: Slot) {
        let slots_since_genesis = slot
            .as_u64()
            .checked_sub(self.genesis_slot.as_u64())
            .expect("slot must be post-genesis");

        *self.current_time.write() =
            self.genesis_duration + self.slot_duration * slots_since_genesis as u32;
    }

    /// Advances the "present" moment by one whole slot.
    pub fn advance_slot(&self) {
        let slot = self
            .now()
            .expect("the clock is always post-genesis when advancing");
        self.set_slot(slot + 1)
    }

    fn slot_of(&self, now: Duration) -> Option<Slot> {
        let genesis = self.genesis_duration;

        if now >= genesis {
            let since_genesis = now
                .checked_sub(genesis)
                .expect("now is greater than or equal to genesis");
            let slot =
                Slot::from((since_genesis.as_millis() / self.slot_duration.as_millis()) as u64);
            Some(slot + self.genesis_slot)
        } else {
            None
        }
    }
}

impl SlotClock for ManualSlotClock {
    fn new(genesis_slot: Slot, genesis_duration: Duration, slot_duration: Duration) -> Self {
        if slot_duration.as_millis() == 0 {
            panic!("ManualSlotClock cannot have a < 1ms slot duration");
        }

        Self {
            genesis_slot,
            current_time: RwLock::new(genesis_duration),
            genesis_duration,
            slot_duration,
        }
    }

    fn now(&self) -> Option<Slot> {
        self.slot_of(*self.current_time.read())
    }

    fn slot_duration(&self) -> Duration {
        self.slot_duration
    }

    fn duration_to_next_slot(&self) -> Option<Duration> {
        let now = *self.current_time.read();
        if now < self.genesis_duration {
            Some(self.genesis_duration - now)
        } else {
            let duration_into_slot = (now - self.genesis_duration).as_millis()
                % self.slot_duration.as_millis();
            Some(Duration::from_millis(
                (self.slot_duration.as_millis() - duration_into_slot) as u64,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_now() {
        let clock = ManualSlotClock::new(
            Slot::new(10),
            Duration::from_secs(0),
            Duration::from_secs(1),
        );
        assert_eq!(clock.now(), Some(Slot::new(10)));

        clock.set_slot(Slot::new(123));
        assert_eq!(clock.now(), Some(Slot::new(123)));

        clock.advance_slot();
        assert_eq!(clock.now(), Some(Slot::new(124)));
    }

    #[test]
    fn pre_genesis_is_none() {
        let clock = ManualSlotClock::new(
            Slot::new(0),
            Duration::from_secs(100),
            Duration::from_secs(1),
        );
        assert_eq!(*clock.current_time.read(), Duration::from_secs(100));

        *clock.current_time.write() = Duration::from_secs(99);
        assert_eq!(clock.now(), None);
    }
}
