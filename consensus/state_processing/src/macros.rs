/// Fails an operation verification with the given reason unless the condition holds.
macro_rules! verify {
    ($condition: expr, $result: expr) => {
        if !$condition {
            return Err(crate::per_block_processing::errors::BlockOperationError::invalid(
                $result,
            ));
        }
    };
}

/// Fails block processing with the given error unless the condition holds.
macro_rules! block_verify {
    ($condition: expr, $result: expr) => {
        if !$condition {
            return Err($result);
        }
    };
}
