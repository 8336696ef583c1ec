/* Calling-convention selection
 *
 * Go exposes fixed-arity foreign calls: syscall.Syscall (3 argument words),
 * Syscall6 and Syscall9. The receiver always takes the first word; the
 * marshaled parameter slots follow and the rest of the tier is zero-filled.
 */

use crate::error::{GenError, GenResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyscallTier {
    pub arity: usize,
    pub function: &'static str,
}

pub const SYSCALL3: SyscallTier = SyscallTier {
    arity: 3,
    function: "Syscall",
};
pub const SYSCALL6: SyscallTier = SyscallTier {
    arity: 6,
    function: "Syscall6",
};
pub const SYSCALL9: SyscallTier = SyscallTier {
    arity: 9,
    function: "Syscall9",
};

/* Widest supported call, receiver included */
pub const MAX_CALL_SLOTS: usize = 9;

/* Indexed by total slot count (receiver included) */
const TIER_BY_SLOT_COUNT: [SyscallTier; MAX_CALL_SLOTS + 1] = [
    SYSCALL3, SYSCALL3, SYSCALL3, SYSCALL3, SYSCALL6, SYSCALL6, SYSCALL6, SYSCALL9, SYSCALL9,
    SYSCALL9,
];

/// Smallest tier that fits `total_slots`, or `None` above nine.
pub fn select_tier(total_slots: usize) -> Option<SyscallTier> {
    TIER_BY_SLOT_COUNT.get(total_slots).copied()
}

/// Everything the stub emitter needs to write one foreign call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPlan {
    pub tier: SyscallTier,
    /* receiver plus marshaled slots, before padding */
    pub total_slots: usize,
    /* argument words after the receiver, padded to the tier width */
    pub args: Vec<String>,
}

impl CallPlan {
    pub fn padding(&self) -> usize {
        self.tier.arity - self.total_slots
    }
}

pub fn plan_call(interface: &str, method: &str, slots: Vec<String>) -> GenResult<CallPlan> {
    let total_slots = slots.len() + 1;
    let tier = select_tier(total_slots).ok_or_else(|| GenError::TooManySlots {
        interface: interface.to_string(),
        method: method.to_string(),
        required: total_slots,
        max: MAX_CALL_SLOTS,
    })?;

    let mut args = slots;
    args.resize(tier.arity - 1, "0".to_string());

    Ok(CallPlan {
        tier,
        total_slots,
        args,
    })
}
