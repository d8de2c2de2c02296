//! Trace-line decoding
//!
//! The simulation core never sees raw text; this module turns one
//! trace line (`<hex-address> <mnemonic> [operands...]`) into a
//! decoded record for dispatch.

use crate::error::TraceError;

/// One decoded trace line
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRecord {
    pub address: u32,
    pub op: TraceOp,
}

/// Dispatch shape of a decoded trace line
#[derive(Clone, Debug, PartialEq)]
pub enum TraceOp {
    RType { mnemonic: String, dest_reg: i32, reg1: i32, reg2_or_constant: i32 },
    Load { dest_reg: i32, data_address: u32 },
    Store { src_reg: i32, data_address: u32 },
    Branch,
    Jump { mnemonic: String },
    Syscall,
    Nop,
}

/// Convert a register or constant token to an integer: a trailing
/// comma and a leading `$` sigil are stripped before parsing
pub fn parse_register(token: &str) -> Option<i32> {
    let token = token.strip_suffix(',').unwrap_or(token);
    let token = token.strip_prefix('$').unwrap_or(token);
    token.parse().ok()
}

fn parse_hex(token: &str) -> Option<u32> {
    let token = token.strip_prefix("0x").unwrap_or(token);
    u32::from_str_radix(token, 16).ok()
}

/// Decode one non-empty trace line. `line_number` is 1-based and
/// only used for error reporting.
pub fn parse_line(
    line: &str,
    line_number: usize,
) -> Result<TraceRecord, TraceError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(TraceError::Malformed {
            line: line_number,
            reason: "expected an address and a mnemonic".to_string(),
        });
    }

    let address = parse_hex(tokens[0]).ok_or_else(|| TraceError::Malformed {
        line: line_number,
        reason: format!("invalid instruction address '{}'", tokens[0]),
    })?;
    let mnemonic = tokens[1];

    let operands = |count: usize| -> Result<(), TraceError> {
        if tokens.len() != 2 + count {
            return Err(TraceError::MalformedOperands {
                mnemonic: mnemonic.to_string(),
                address,
                line: line_number,
            });
        }
        Ok(())
    };
    let register = |token: &str| -> Result<i32, TraceError> {
        parse_register(token).ok_or_else(|| TraceError::BadRegister {
            token: token.to_string(),
            line: line_number,
        })
    };

    let op = if mnemonic.starts_with("add")
        || mnemonic.starts_with("sll")
        || mnemonic.starts_with("ori")
    {
        operands(3)?;
        TraceOp::RType {
            mnemonic: mnemonic.to_string(),
            dest_reg: register(tokens[2])?,
            reg1: register(tokens[3])?,
            reg2_or_constant: register(tokens[4])?,
        }
    } else if mnemonic == "lui" {
        // The constant operand carries no timing meaning
        operands(2)?;
        TraceOp::RType {
            mnemonic: mnemonic.to_string(),
            dest_reg: register(tokens[2])?,
            reg1: -1,
            reg2_or_constant: -1,
        }
    } else if mnemonic.starts_with("lw") || mnemonic.starts_with("sw") {
        // register, offset-with-base text, resolved data address;
        // only the register and the data address matter for timing
        operands(3)?;
        let reg = register(tokens[2])?;
        let data_address =
            parse_hex(tokens[4]).ok_or_else(|| TraceError::Malformed {
                line: line_number,
                reason: format!("invalid data address '{}'", tokens[4]),
            })?;
        if mnemonic.starts_with("lw") {
            TraceOp::Load { dest_reg: reg, data_address }
        } else {
            TraceOp::Store { src_reg: reg, data_address }
        }
    } else if mnemonic.starts_with("beq") {
        // Operand registers are not needed for timing
        TraceOp::Branch
    } else if mnemonic.starts_with('j') {
        TraceOp::Jump { mnemonic: mnemonic.to_string() }
    } else if mnemonic == "syscall" {
        TraceOp::Syscall
    } else if mnemonic == "nop" {
        TraceOp::Nop
    } else {
        return Err(TraceError::UnknownInstruction {
            mnemonic: mnemonic.to_string(),
            address,
            line: line_number,
        });
    };

    Ok(TraceRecord { address, op })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_register_strips_sigil_and_comma() {
        assert_eq!(parse_register("$2,"), Some(2));
        assert_eq!(parse_register("$31"), Some(31));
        assert_eq!(parse_register("4"), Some(4));
        assert_eq!(parse_register("-1"), Some(-1));
        assert_eq!(parse_register("$zero"), None);
    }

    #[test]
    fn test_parse_rtype() {
        let record = parse_line("400000 add $1, $2, $3", 1).unwrap();
        assert_eq!(record.address, 0x400000);
        assert_eq!(
            record.op,
            TraceOp::RType {
                mnemonic: "add".to_string(),
                dest_reg: 1,
                reg1: 2,
                reg2_or_constant: 3,
            }
        );
    }

    #[test]
    fn test_parse_immediate_rtype_constant_operand() {
        let record = parse_line("400004 sll $3, $2, 4", 2).unwrap();
        assert_eq!(
            record.op,
            TraceOp::RType {
                mnemonic: "sll".to_string(),
                dest_reg: 3,
                reg1: 2,
                reg2_or_constant: 4,
            }
        );
    }

    #[test]
    fn test_parse_lui_ignores_constant() {
        let record = parse_line("400008 lui $5, 4097", 3).unwrap();
        assert_eq!(
            record.op,
            TraceOp::RType {
                mnemonic: "lui".to_string(),
                dest_reg: 5,
                reg1: -1,
                reg2_or_constant: -1,
            }
        );
    }

    #[test]
    fn test_parse_load_and_store() {
        let record = parse_line("40000c lw $2, 4($3) 10010004", 4).unwrap();
        assert_eq!(
            record.op,
            TraceOp::Load { dest_reg: 2, data_address: 0x10010004 }
        );

        let record = parse_line("400010 sw $2, 8($3) 10010008", 5).unwrap();
        assert_eq!(
            record.op,
            TraceOp::Store { src_reg: 2, data_address: 0x10010008 }
        );
    }

    #[test]
    fn test_parse_control_and_misc() {
        assert_eq!(
            parse_line("400014 beq $1, $2, loop", 6).unwrap().op,
            TraceOp::Branch
        );
        assert_eq!(
            parse_line("400018 jal 400100", 7).unwrap().op,
            TraceOp::Jump { mnemonic: "jal".to_string() }
        );
        assert_eq!(
            parse_line("40001c jr $31", 8).unwrap().op,
            TraceOp::Jump { mnemonic: "jr".to_string() }
        );
        assert_eq!(
            parse_line("400020 syscall", 9).unwrap().op,
            TraceOp::Syscall
        );
        assert_eq!(parse_line("400024 nop", 10).unwrap().op, TraceOp::Nop);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            parse_line("400000", 1),
            Err(TraceError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            parse_line("nothex add $1, $2, $3", 2),
            Err(TraceError::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            parse_line("400000 add $1, $2", 3),
            Err(TraceError::MalformedOperands { line: 3, .. })
        ));
        assert!(matches!(
            parse_line("400000 add $1, $2, $foo", 4),
            Err(TraceError::BadRegister { line: 4, .. })
        ));
        assert!(matches!(
            parse_line("400000 mult $1, $2, $3", 5),
            Err(TraceError::UnknownInstruction { line: 5, .. })
        ));
    }
}
