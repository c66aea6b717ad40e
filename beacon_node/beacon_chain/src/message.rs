use crate::beacon_chain::BeaconChain;
use crate::errors::BeaconChainError;
use slog::crit;
use slot_clock::SlotClock;
use std::sync::mpsc::Receiver;
use store::Store;
use types::{Attestation, BeaconBlock, EthSpec, Slot};

/// The inputs of the pipeline, processed strictly in arrival (FIFO) order.
#[derive(Debug)]
pub enum Message<E: EthSpec> {
    Block(Box<BeaconBlock<E>>),
    Attestation(Box<Attestation<E>>),
    /// A clock tick, one per slot interval.
    Tick(Slot),
    Shutdown,
}

/// Why the pipeline stopped; maps onto the process exit code for an embedding binary.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ExitReason {
    Normal,
    StateTransitionFailure,
    StorageCorruption,
    ConfigurationError,
}

impl ExitReason {
    pub fn exit_code(self) -> i32 {
        match self {
            ExitReason::Normal => 0,
            ExitReason::StateTransitionFailure => 2,
            ExitReason::StorageCorruption => 3,
            ExitReason::ConfigurationError => 4,
        }
    }
}

/// Drive the pipeline from an ordered message queue until the queue closes, a `Shutdown`
/// message arrives, or a fatal error occurs.
///
/// Recoverable conditions never surface here: bad blocks and attestations are dropped inside
/// the chain (with aggregate counters), unknown parents and future slots are parked. Only
/// invariant violations and storage failures end the loop abnormally.
pub fn run<E: EthSpec, S: Store, C: SlotClock>(
    chain: &mut BeaconChain<E, S, C>,
    messages: Receiver<Message<E>>,
) -> ExitReason {
    while let Ok(message) = messages.recv() {
        let result = match message {
            Message::Block(block) => chain.process_block(*block).map(|_| ()),
            Message::Attestation(attestation) => {
                chain.process_attestation(*attestation).map(|_| ())
            }
            Message::Tick(slot) => chain.on_tick(slot),
            Message::Shutdown => return ExitReason::Normal,
        };

        if let Err(e) = result {
            let reason = match &e {
                BeaconChainError::StorageFailure(_) => ExitReason::StorageCorruption,
                BeaconChainError::InvariantViolation(_) => ExitReason::StateTransitionFailure,
            };
            crit!(chain.log(), "Pipeline terminating"; "error" => format!("{:?}", e));
            return reason;
        }
    }

    ExitReason::Normal
}
