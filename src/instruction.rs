//! Decoded instruction events

/// One decoded trace instruction with its kind-specific payload.
/// Base registers are retained for fidelity with the trace format
/// but carry no timing meaning; the decoder always supplies -1.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InstructionKind {
    /// Empty slot or an explicit no-op from the trace
    #[default]
    Nop,
    RType {
        mnemonic: String,
        reg1: i32,
        reg2_or_constant: i32,
        dest_reg: i32,
    },
    Load {
        data_address: u32,
        dest_reg: i32,
        base_reg: i32,
    },
    Store {
        data_address: u32,
        src_reg: i32,
        base_reg: i32,
    },
    Branch {
        reg1: i32,
        reg2: i32,
    },
    Jump {
        mnemonic: String,
    },
    Syscall,
}

impl InstructionKind {
    /// Short tag used by the pipeline dump
    pub fn label(&self) -> &'static str {
        match self {
            InstructionKind::Nop => "nop",
            InstructionKind::RType { .. } => "rtype",
            InstructionKind::Load { .. } => "load",
            InstructionKind::Store { .. } => "store",
            InstructionKind::Branch { .. } => "branch",
            InstructionKind::Jump { .. } => "jump",
            InstructionKind::Syscall => "syscall",
        }
    }
}

/// True for immediate-form mnemonics (`addi`, `ori`, ...), whose
/// second operand is a constant rather than a register number
pub fn is_immediate_form(mnemonic: &str) -> bool {
    mnemonic.ends_with('i')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_form() {
        assert!(is_immediate_form("addi"));
        assert!(is_immediate_form("ori"));
        assert!(is_immediate_form("slli"));
        assert!(!is_immediate_form("add"));
        assert!(!is_immediate_form("sll"));
    }
}
