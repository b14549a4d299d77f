//! Line-oriented driver for a packing station
//!
//! Reads commands, executes them against the [`Station`] and writes one
//! JSON [`OperationResponse`] per command.

use crate::command::{Command, HELP};
use anyhow::Result;
use packing::{OperationResponse, Station};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// What one input line produced
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Respond(OperationResponse),
    Skip,
    Quit,
}

/// Totals for a console run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub commands: usize,
    pub failures: usize,
}

pub struct Console {
    station: Station,
}

impl Console {
    pub fn new(station: Station) -> Self {
        Self { station }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn into_station(self) -> Station {
        self.station
    }

    /// Parse and execute one line. Parse errors become failed responses.
    pub fn handle_line(&mut self, line: &str) -> Step {
        match Command::parse(line) {
            Ok(None) => Step::Skip,
            Ok(Some(Command::Quit)) => Step::Quit,
            Ok(Some(cmd)) => Step::Respond(self.execute(cmd)),
            Err(e) => Step::Respond(OperationResponse::rejected(e.code(), e.to_string())),
        }
    }

    pub fn execute(&mut self, cmd: Command) -> OperationResponse {
        debug!(command = cmd.name(), "Executing");
        let station = &mut self.station;
        match cmd {
            Command::Login { username, password } => {
                Station::respond(station.login(&username, &password), "Logged in")
            }
            Command::Logout => match station.logout() {
                Some(user) => OperationResponse::ok("Logged out").with_data(user),
                None => OperationResponse::ok("Not logged in"),
            },
            Command::Register {
                packer_id,
                workstation_id,
            } => Station::respond(
                station.register_workstation(packer_id.as_deref(), workstation_id.as_deref()),
                "Workstation registered",
            ),
            Command::Claim { hu } => {
                Station::respond(station.claim_handling_unit(&hu), "Handling unit loaded")
            }
            Command::Scan {
                order_item_id,
                code,
            } => Station::respond(
                station.scan_item(&order_item_id, &code),
                format!("Item {} scanned", order_item_id),
            ),
            Command::Imei {
                order_item_id,
                values,
            } => Station::respond(
                station.verify_imei(&order_item_id, values),
                format!("IMEI verified for {}", order_item_id),
            ),
            Command::Select { box_id } => Station::respond(
                station.select_box(&box_id),
                format!("Box {} selected", box_id),
            ),
            Command::Deselect { box_id } => Station::respond(
                station.deselect_box(&box_id),
                format!("Box {} deselected", box_id),
            ),
            Command::ScanBox { box_id, barcode } => Station::respond(
                station.scan_box(&box_id, &barcode),
                format!("Box {} scanned", box_id),
            ),
            Command::ToggleManual => match station.toggle_manual_mode() {
                Ok(mode) => OperationResponse::ok(format!("Box mode: {}", mode)).with_data(mode),
                Err(e) => OperationResponse::failure(&e.into()),
            },
            Command::AddBox { barcode } => match station.add_manual_box(&barcode) {
                Ok(b) => OperationResponse::ok(format!("Box {} added", b.box_id)).with_data(b),
                Err(e) => OperationResponse::failure(&e.into()),
            },
            Command::Assign {
                order_item_id,
                box_id,
            } => Station::respond(
                station.reassign_item_to_box(&order_item_id, &box_id),
                format!("Item {} moved to {}", order_item_id, box_id),
            ),
            Command::Status => {
                let status = station.status();
                OperationResponse::ok(status.to_string()).with_data(status)
            }
            Command::Submit => match station.submit_package() {
                Ok(summary) => OperationResponse::ok(format!(
                    "Package {} submitted ({} items, {} boxes)",
                    summary.package_id,
                    summary.item_count,
                    summary.boxes.len()
                ))
                .with_data(summary),
                Err(e) => OperationResponse::failure(&e.into()),
            },
            Command::NewOrder => {
                let hu = station.start_new_order();
                OperationResponse::ok("Ready for the next handling unit").with_data(hu)
            }
            Command::Help => OperationResponse::ok(HELP),
            Command::Quit => OperationResponse::ok("Bye"),
        }
    }

    /// Drive the console until end of input or `quit`
    pub async fn run<R, W>(&mut self, reader: R, writer: &mut W) -> Result<RunSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = RunSummary::default();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let response = match self.handle_line(&line) {
                Step::Skip => continue,
                Step::Quit => break,
                Step::Respond(response) => response,
            };

            summary.commands += 1;
            if !response.success {
                summary.failures += 1;
            }

            let json = serde_json::to_string(&response)?;
            writer.write_all(json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        info!(
            commands = summary.commands,
            failures = summary.failures,
            "Console input finished"
        );
        Ok(summary)
    }
}
