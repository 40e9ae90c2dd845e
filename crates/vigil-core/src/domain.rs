use std::collections::HashSet;

/// Numeric identity of an account or message sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Platform message id. Ordered so the scanner's dedup cursor can compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub i64);

/// Sender ids belonging to the operator's own accounts. Built once at
/// startup, read-only afterwards; never alerted on.
pub type Whitelist = HashSet<UserId>;
