//! Scanner console commands
//!
//! One command per line, tokenized with POSIX shell quoting so that a
//! barcode or IMEI containing spaces (or an empty value) can be passed as
//! `""`. Blank lines and `#` comments are skipped.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unbalanced quotes in input")]
    BadQuoting,

    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("Usage: {usage}")]
    Usage { usage: &'static str },

    #[error("Unknown option '{option}' for {command}")]
    UnknownOption {
        command: &'static str,
        option: String,
    },
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadQuoting => "BAD_QUOTING",
            Self::Unknown(_) => "UNKNOWN_COMMAND",
            Self::Usage { .. } | Self::UnknownOption { .. } => "BAD_ARGUMENTS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    Logout,
    Register {
        packer_id: Option<String>,
        workstation_id: Option<String>,
    },
    Claim {
        hu: String,
    },
    Scan {
        order_item_id: String,
        code: String,
    },
    Imei {
        order_item_id: String,
        values: Vec<String>,
    },
    Select {
        box_id: String,
    },
    Deselect {
        box_id: String,
    },
    ScanBox {
        box_id: String,
        barcode: String,
    },
    ToggleManual,
    AddBox {
        barcode: String,
    },
    Assign {
        order_item_id: String,
        box_id: String,
    },
    Status,
    Submit,
    NewOrder,
    Help,
    Quit,
}

pub const HELP: &str = "\
login USER PASSWORD            log in
logout                         log out and discard the active unit
register [--packer ID] [--workstation ID]
claim HU                       scan a handling unit
scan ITEM CODE                 scan an item's UPC or SKU
imei ITEM VALUE...             capture one IMEI per slot
select BOX | deselect BOX      choose boxes in the current mode
scan-box BOX BARCODE           scan the physical box
manual                         toggle auto/manual box mode
add-box BARCODE                add a scanned box (manual mode)
assign ITEM BOX                move an item into a box
status                         show progress and blockers
submit                         submit the package
new-order                      discard the unit and start over
help | quit";

fn usage(usage: &'static str) -> CommandError {
    CommandError::Usage { usage }
}

/// Exactly `N` positional arguments
fn exact<const N: usize>(
    args: Vec<String>,
    text: &'static str,
) -> Result<[String; N], CommandError> {
    args.try_into().map_err(|_| usage(text))
}

impl Command {
    /// Command word, safe to log (never includes arguments)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Register { .. } => "register",
            Self::Claim { .. } => "claim",
            Self::Scan { .. } => "scan",
            Self::Imei { .. } => "imei",
            Self::Select { .. } => "select",
            Self::Deselect { .. } => "deselect",
            Self::ScanBox { .. } => "scan-box",
            Self::ToggleManual => "manual",
            Self::AddBox { .. } => "add-box",
            Self::Assign { .. } => "assign",
            Self::Status => "status",
            Self::Submit => "submit",
            Self::NewOrder => "new-order",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }

    /// Parse one input line. `Ok(None)` for blank and comment lines.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let mut tokens = shlex::split(trimmed).ok_or(CommandError::BadQuoting)?;
        if tokens.is_empty() {
            return Ok(None);
        }
        let name = tokens.remove(0);
        let args = tokens;

        let cmd = match name.as_str() {
            "login" => {
                let [username, password] = exact(args, "login USER PASSWORD")?;
                Self::Login { username, password }
            }
            "logout" => {
                exact::<0>(args, "logout")?;
                Self::Logout
            }
            "register" => parse_register(args)?,
            "claim" => {
                let [hu] = exact(args, "claim HU")?;
                Self::Claim { hu }
            }
            "scan" => {
                let [order_item_id, code] = exact(args, "scan ITEM CODE")?;
                Self::Scan {
                    order_item_id,
                    code,
                }
            }
            "imei" => {
                let mut args = args.into_iter();
                let order_item_id = args.next().ok_or_else(|| usage("imei ITEM VALUE..."))?;
                Self::Imei {
                    order_item_id,
                    values: args.collect(),
                }
            }
            "select" => {
                let [box_id] = exact(args, "select BOX")?;
                Self::Select { box_id }
            }
            "deselect" => {
                let [box_id] = exact(args, "deselect BOX")?;
                Self::Deselect { box_id }
            }
            "scan-box" => {
                let [box_id, barcode] = exact(args, "scan-box BOX BARCODE")?;
                Self::ScanBox { box_id, barcode }
            }
            "manual" => {
                exact::<0>(args, "manual")?;
                Self::ToggleManual
            }
            "add-box" => {
                let [barcode] = exact(args, "add-box BARCODE")?;
                Self::AddBox { barcode }
            }
            "assign" => {
                let [order_item_id, box_id] = exact(args, "assign ITEM BOX")?;
                Self::Assign {
                    order_item_id,
                    box_id,
                }
            }
            "status" => {
                exact::<0>(args, "status")?;
                Self::Status
            }
            "submit" => {
                exact::<0>(args, "submit")?;
                Self::Submit
            }
            "new-order" => {
                exact::<0>(args, "new-order")?;
                Self::NewOrder
            }
            "help" => {
                exact::<0>(args, "help")?;
                Self::Help
            }
            "quit" | "exit" => {
                exact::<0>(args, "quit")?;
                Self::Quit
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(cmd))
    }
}

fn parse_register(args: Vec<String>) -> Result<Command, CommandError> {
    const USAGE: &str = "register [--packer ID] [--workstation ID]";
    let mut packer_id = None;
    let mut workstation_id = None;

    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        let slot = match flag.as_str() {
            "--packer" => &mut packer_id,
            "--workstation" => &mut workstation_id,
            _ => {
                return Err(CommandError::UnknownOption {
                    command: "register",
                    option: flag,
                })
            }
        };
        *slot = Some(args.next().ok_or_else(|| usage(USAGE))?);
    }

    Ok(Command::Register {
        packer_id,
        workstation_id,
    })
}
