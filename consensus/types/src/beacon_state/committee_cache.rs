use super::{get_active_validator_indices, BeaconState, Error};
use crate::{BeaconCommittee, ChainSpec, Domain, Epoch, EthSpec, RelativeEpoch, Slot};
use std::num::NonZeroUsize;
use std::ops::Range;
use swap_or_not_shuffle::shuffle_list;

/// Computes and stores the shuffling for an epoch. Provides various getters to allow callers to
/// read the committees for the given epoch.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct CommitteeCache {
    initialized_epoch: Option<Epoch>,
    shuffling: Vec<usize>,
    shuffling_positions: Vec<Option<NonZeroUsize>>,
    committees_per_slot: u64,
    slots_per_epoch: u64,
}

impl CommitteeCache {
    /// Return a new, fully initialized cache.
    ///
    /// Spec v0.12.1
    pub fn initialized<T: EthSpec>(
        state: &BeaconState<T>,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<CommitteeCache, Error> {
        RelativeEpoch::from_epoch(state.current_epoch(), epoch)
            .map_err(|_| Error::EpochOutOfBounds)?;

        let active_validator_indices = get_active_validator_indices(&state.validators, epoch);

        if active_validator_indices.is_empty() {
            return Err(Error::InsufficientValidators);
        }

        let committees_per_slot =
            T::get_committee_count_per_slot(active_validator_indices.len(), spec) as u64;

        let seed = state.get_seed(epoch, Domain::BeaconAttester, spec)?;

        let shuffling = shuffle_list(
            active_validator_indices,
            spec.shuffle_round_count,
            &seed[..],
            false,
        )
        .ok_or(Error::UnableToShuffle)?;

        // The use of `NonZeroUsize` reduces the maximum number of possible validators by one.
        if state.validators.len() == usize::max_value() {
            return Err(Error::TooManyValidators);
        }

        let mut shuffling_positions = vec![None; state.validators.len()];
        for (i, v) in shuffling.iter().enumerate() {
            shuffling_positions[*v] = NonZeroUsize::new(i + 1);
        }

        Ok(CommitteeCache {
            initialized_epoch: Some(epoch),
            shuffling,
            shuffling_positions,
            committees_per_slot,
            slots_per_epoch: T::slots_per_epoch(),
        })
    }

    /// Returns `true` if the cache has been initialized at the supplied `epoch`.
    ///
    /// An non-initialized cache does not provide any useful information.
    pub fn is_initialized_at(&self, epoch: Epoch) -> bool {
        Some(epoch) == self.initialized_epoch
    }

    /// Returns the shuffled list of active validator indices for the initialized epoch.
    ///
    /// Always returns `&[]` for a non-initialized epoch.
    pub fn active_validator_indices(&self) -> &[usize] {
        &self.shuffling
    }

    /// Returns the shuffled list of active validator indices for the initialized epoch.
    ///
    /// Always returns `&[]` for a non-initialized epoch.
    pub fn shuffling(&self) -> &[usize] {
        &self.shuffling
    }

    /// Returns the number of active validators in the initialized epoch.
    ///
    /// Always returns `usize::default()` for a non-initialized epoch.
    pub fn active_validator_count(&self) -> usize {
        self.shuffling.len()
    }

    /// Returns the number of committees per slot for this cache's epoch.
    pub fn committees_per_slot(&self) -> u64 {
        self.committees_per_slot
    }

    /// Returns the total number of committees in the initialized epoch.
    ///
    /// Always returns `usize::default()` for a non-initialized epoch.
    pub fn epoch_committee_count(&self) -> usize {
        self.committees_per_slot as usize * self.slots_per_epoch as usize
    }

    /// Get the Beacon committee for the given `slot` and `index`.
    ///
    /// Return `None` if the cache is uninitialized, or the `slot` or `index` is out of range.
    pub fn get_beacon_committee(&self, slot: Slot, index: u64) -> Option<BeaconCommittee> {
        if self.initialized_epoch.is_none()
            || !self.is_initialized_at(slot.epoch(self.slots_per_epoch))
            || index >= self.committees_per_slot
        {
            return None;
        }

        let committee_index =
            (slot.as_u64() % self.slots_per_epoch) * self.committees_per_slot + index;
        let committee = self.compute_committee(committee_index as usize)?;

        Some(BeaconCommittee {
            slot,
            index,
            committee,
        })
    }

    /// Get all the Beacon committees at all slots of the initialized epoch.
    pub fn get_all_beacon_committees(&self) -> Result<Vec<BeaconCommittee>, Error> {
        let initialized_epoch = self
            .initialized_epoch
            .ok_or(Error::CommitteeCacheUninitialized(None))?;

        initialized_epoch
            .slot_iter(self.slots_per_epoch)
            .map(|slot| {
                (0..self.committees_per_slot)
                    .map(|index| {
                        self.get_beacon_committee(slot, index)
                            .ok_or(Error::UnableToDetermineProducer)
                    })
                    .collect()
            })
            .collect::<Result<Vec<Vec<BeaconCommittee>>, Error>>()
            .map(|committees| committees.into_iter().flatten().collect())
    }

    /// Returns the index of some validator in `self.shuffling`.
    ///
    /// Always returns `None` for a non-initialized epoch.
    pub fn shuffled_position(&self, validator_index: usize) -> Option<usize> {
        self.shuffling_positions
            .get(validator_index)?
            .map(|p| p.get() - 1)
    }

    /// Returns a slice of `self.shuffling` that represents the `index`'th committee in the epoch.
    ///
    /// The committees are assigned by slicing the shuffled active set: committee `i` of `count`
    /// covers `[n * i / count, n * (i + 1) / count)`.
    fn compute_committee(&self, index: usize) -> Option<&[usize]> {
        Some(&self.shuffling[self.compute_committee_range(index)?])
    }

    /// Returns a range of `self.shuffling` that represents the `index`'th committee in the epoch.
    fn compute_committee_range(&self, index: usize) -> Option<Range<usize>> {
        let count = self.epoch_committee_count();
        if count == 0 || index >= count {
            return None;
        }

        let num_validators = self.shuffling.len();

        let start = (num_validators * index) / count;
        let end = (num_validators * (index + 1)) / count;

        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestingBeaconStateBuilder;
    use crate::MinimalEthSpec;

    type E = MinimalEthSpec;

    #[test]
    fn default_is_uninitialized() {
        let cache = CommitteeCache::default();

        assert!(!cache.is_initialized_at(Epoch::new(0)));
        assert!(cache.get_beacon_committee(Slot::new(0), 0).is_none());
        assert_eq!(cache.active_validator_count(), 0);
    }

    #[test]
    fn initializes_with_enough_validators() {
        let spec = E::default_spec();
        let (state, _) = TestingBeaconStateBuilder::<E>::new(16, &spec).build();

        let cache = CommitteeCache::initialized(&state, state.current_epoch(), &spec).unwrap();

        assert!(cache.is_initialized_at(state.current_epoch()));
        assert_eq!(cache.active_validator_count(), 16);
        assert!(cache.epoch_committee_count() > 0);
    }

    #[test]
    fn shuffled_positions_invert_the_shuffling() {
        let spec = E::default_spec();
        let (state, _) = TestingBeaconStateBuilder::<E>::new(23, &spec).build();

        let cache = CommitteeCache::initialized(&state, state.current_epoch(), &spec).unwrap();

        for (position, validator_index) in cache.shuffling().iter().enumerate() {
            assert_eq!(cache.shuffled_position(*validator_index), Some(position));
        }
    }

    #[test]
    fn rejects_out_of_window_epochs() {
        let spec = E::default_spec();
        let (state, _) = TestingBeaconStateBuilder::<E>::new(16, &spec).build();

        assert_eq!(
            CommitteeCache::initialized(&state, state.current_epoch() + 2, &spec),
            Err(Error::EpochOutOfBounds)
        );
    }
}
