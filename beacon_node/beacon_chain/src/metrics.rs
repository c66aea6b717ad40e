use pharos_metrics::{try_create_int_counter, try_create_int_gauge, IntCounter, IntGauge, Result};

lazy_static! {
    /*
     * Hashing
     */
    pub static ref HASHES_PERFORMED: Result<IntGauge> = try_create_int_gauge(
        "beacon_hashes_performed",
        "Number of tree hash invocations performed by this process"
    );

    /*
     * Block processing
     */
    pub static ref BLOCKS_APPLIED: Result<IntCounter> = try_create_int_counter(
        "beacon_blocks_applied_total",
        "Count of blocks applied to the canonical store"
    );
    pub static ref BLOCKS_REJECTED: Result<IntCounter> = try_create_int_counter(
        "beacon_blocks_rejected_total",
        "Count of blocks dropped as invalid"
    );
    pub static ref BLOCKS_AWAITING_PARENT: Result<IntCounter> = try_create_int_counter(
        "beacon_blocks_awaiting_parent_total",
        "Count of blocks parked while their parent is unknown"
    );
    pub static ref BLOCKS_FROM_THE_FUTURE: Result<IntCounter> = try_create_int_counter(
        "beacon_blocks_from_the_future_total",
        "Count of blocks parked until the wall clock reaches their slot"
    );
    pub static ref PARENT_WAIT_EXPIRIES: Result<IntCounter> = try_create_int_counter(
        "beacon_parent_wait_expiries_total",
        "Count of parked blocks dropped because their parent never arrived"
    );

    /*
     * Attestation processing
     */
    pub static ref ATTESTATIONS_STAGED: Result<IntCounter> = try_create_int_counter(
        "beacon_attestations_staged_total",
        "Count of attestations staged into the pool"
    );
    pub static ref ATTESTATIONS_DEFERRED: Result<IntCounter> = try_create_int_counter(
        "beacon_attestations_deferred_total",
        "Count of attestations parked while their block is unknown"
    );
    pub static ref ATTESTATIONS_DROPPED: Result<IntCounter> = try_create_int_counter(
        "beacon_attestations_dropped_total",
        "Count of attestations dropped as invalid or expired"
    );

    /*
     * Head tracking
     */
    pub static ref HEAD_CHANGES: Result<IntCounter> = try_create_int_counter(
        "beacon_head_changes_total",
        "Count of canonical head updates"
    );
    pub static ref REORGS: Result<IntCounter> = try_create_int_counter(
        "beacon_reorgs_total",
        "Count of head updates that did not extend the previous head"
    );
}
