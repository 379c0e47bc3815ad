//! Interactive timing session.
//!
//! A line-oriented console over the record store: stdin commands mutate
//! records and segments, a one second tick keeps running totals live on a
//! status line, and exports write CSV or aligned-text files. The stdin
//! reader runs on its own thread feeding a channel; the session loop waits
//! on that channel with the tick period as timeout, so command handling and
//! tick refresh interleave on one logical execution context.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use chrono::Local;
use podium_core::export::UNNAMED;
use podium_core::{
    Clock, DISCUSSANT_PRESETS, RecordStore, Role, SPEAKER_PRESETS, SegmentState, SystemClock,
    TICK_INTERVAL, Thresholds, export_rows, format_clock, format_duration, render_csv,
    render_table,
};

use crate::Config;

/// Byte-order mark so spreadsheet apps sniff the CSV as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Runs an interactive session until quit or end of input.
pub fn run(config: &Config) -> Result<()> {
    let mut session = Session::new(config, SystemClock);

    println!("podium session; type 'help' for commands, 'quit' to leave");

    let (tx, rx) = mpsc::channel();
    let _reader = thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut status_shown = false;
    loop {
        match rx.recv_timeout(TICK_INTERVAL) {
            Ok(line) => {
                if status_shown {
                    println!();
                    status_shown = false;
                }
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse_line(line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => {
                        for message in session.apply(command) {
                            println!("{message}");
                        }
                    }
                    Err(message) => println!("{message}"),
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if let Some(status) = session.status_line() {
                    print!("\r{status}    ");
                    let _ = io::stdout().flush();
                    status_shown = true;
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

// ========== Console Grammar ==========

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleCommand {
    AddRecord { role: Role, name: String },
    AddSegment { record: usize },
    Start { record: usize, segment: Option<usize> },
    End { record: usize, segment: Option<usize> },
    Delete { record: usize, segment: Option<usize> },
    Rename { record: usize, name: String },
    SetRole { record: usize, role: Role },
    SetMinutes { role: Role, minutes: u32 },
    List,
    Export { format: ExportFormat, path: Option<PathBuf> },
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Csv,
    Text,
}

impl ExportFormat {
    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "csv" => Ok(Self::Csv),
            "txt" | "text" => Ok(Self::Text),
            _ => Err(format!("unknown export format: {s} (csv or txt)")),
        }
    }

    const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

fn parse_number(token: &str) -> Result<usize, String> {
    token
        .parse()
        .map_err(|_| format!("not a number: {token}"))
}

/// Parses one non-empty console line.
fn parse_line(line: &str) -> Result<ConsoleCommand, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, args)) = tokens.split_first() else {
        return Err("empty command".to_string());
    };

    match command {
        "add" => {
            // An optional leading role token, the rest is the name
            let (role, name) = match args.split_first() {
                Some((&first, rest)) => match first.parse::<Role>() {
                    Ok(role) => (role, rest.join(" ")),
                    Err(_) => (Role::default(), args.join(" ")),
                },
                None => (Role::default(), String::new()),
            };
            Ok(ConsoleCommand::AddRecord { role, name })
        }
        "seg" => match args {
            [record] => Ok(ConsoleCommand::AddSegment {
                record: parse_number(record)?,
            }),
            _ => Err("usage: seg <record>".to_string()),
        },
        "start" => match args {
            [record] => Ok(ConsoleCommand::Start {
                record: parse_number(record)?,
                segment: None,
            }),
            [record, segment] => Ok(ConsoleCommand::Start {
                record: parse_number(record)?,
                segment: Some(parse_number(segment)?),
            }),
            _ => Err("usage: start <record> [<segment>]".to_string()),
        },
        "end" => match args {
            [record] => Ok(ConsoleCommand::End {
                record: parse_number(record)?,
                segment: None,
            }),
            [record, segment] => Ok(ConsoleCommand::End {
                record: parse_number(record)?,
                segment: Some(parse_number(segment)?),
            }),
            _ => Err("usage: end <record> [<segment>]".to_string()),
        },
        "del" => match args {
            [record] => Ok(ConsoleCommand::Delete {
                record: parse_number(record)?,
                segment: None,
            }),
            [record, segment] => Ok(ConsoleCommand::Delete {
                record: parse_number(record)?,
                segment: Some(parse_number(segment)?),
            }),
            _ => Err("usage: del <record> [<segment>]".to_string()),
        },
        "name" => match args {
            [record, rest @ ..] if !rest.is_empty() => Ok(ConsoleCommand::Rename {
                record: parse_number(record)?,
                name: rest.join(" "),
            }),
            _ => Err("usage: name <record> <text>".to_string()),
        },
        "role" => match args {
            [record, role] => Ok(ConsoleCommand::SetRole {
                record: parse_number(record)?,
                role: role.parse()?,
            }),
            _ => Err("usage: role <record> <speaker|discussant>".to_string()),
        },
        "min" => match args {
            [role, minutes] => Ok(ConsoleCommand::SetMinutes {
                role: role.parse()?,
                minutes: minutes
                    .parse()
                    .map_err(|_| format!("not a number: {minutes}"))?,
            }),
            _ => Err("usage: min <speaker|discussant> <minutes>".to_string()),
        },
        "list" => Ok(ConsoleCommand::List),
        "export" => {
            let Some((&format, path_args)) = args.split_first() else {
                return Err("usage: export <csv|txt> [<path>]".to_string());
            };
            let format = ExportFormat::parse(format)?;
            let path = if path_args.is_empty() {
                None
            } else {
                Some(PathBuf::from(path_args.join(" ")))
            };
            Ok(ConsoleCommand::Export { format, path })
        }
        "help" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        _ => Err(format!("unknown command: {command} (try 'help')")),
    }
}

fn help_text() -> String {
    let speaker = SPEAKER_PRESETS.map(|m| m.to_string()).join("/");
    let discussant = DISCUSSANT_PRESETS.map(|m| m.to_string()).join("/");
    format!(
        "commands:\n\
         \x20 add [speaker|discussant] [name]     new record with one unused segment\n\
         \x20 seg <record>                        add a segment to a record\n\
         \x20 start <record> [<segment>]          start timing (defaults to the unused segment)\n\
         \x20 end <record> [<segment>]            stop timing (defaults to the running segment)\n\
         \x20 del <record> [<segment>]            delete a record, or one of its segments\n\
         \x20 name <record> <text>                rename a record\n\
         \x20 role <record> <speaker|discussant>  change a record's role\n\
         \x20 min <speaker|discussant> <minutes>  set a threshold (presets {speaker} and {discussant})\n\
         \x20 list                                show records, segments and live totals\n\
         \x20 export <csv|txt> [<path>]           write an export file\n\
         \x20 quit                                leave the session"
    )
}

// ========== Session State ==========

/// Live session state: the record store plus the shared configuration.
struct Session<C> {
    store: RecordStore,
    thresholds: Thresholds,
    export_dir: PathBuf,
    clock: C,
}

impl<C: Clock> Session<C> {
    fn new(config: &Config, clock: C) -> Self {
        Self {
            store: RecordStore::new(),
            thresholds: config.thresholds,
            export_dir: config.export_dir.clone(),
            clock,
        }
    }

    /// Applies one command and returns the lines to print.
    fn apply(&mut self, command: ConsoleCommand) -> Vec<String> {
        match command {
            ConsoleCommand::AddRecord { role, name } => {
                let index = self.store.add_record(role, name);
                vec![format!("added record {index}")]
            }
            ConsoleCommand::AddSegment { record } => {
                if record >= self.store.len() {
                    return vec![format!("no such record {record}")];
                }
                match self.store.add_segment(record) {
                    Ok(()) => {
                        let segment = self.segment_count(record) - 1;
                        vec![format!("added segment {segment} to record {record}")]
                    }
                    Err(err) => {
                        tracing::warn!(record, %err, "rejected new segment");
                        vec![err.to_string()]
                    }
                }
            }
            ConsoleCommand::Start { record, segment } => self.apply_start(record, segment),
            ConsoleCommand::End { record, segment } => self.apply_end(record, segment),
            ConsoleCommand::Delete { record, segment } => {
                if record >= self.store.len() {
                    return vec![format!("no such record {record}")];
                }
                match segment {
                    Some(segment) => {
                        if segment >= self.segment_count(record) {
                            return vec![format!("no such segment {segment} on record {record}")];
                        }
                        self.store.delete_segment(record, segment);
                        vec![format!("deleted segment {segment} of record {record}")]
                    }
                    None => {
                        self.store.delete_record(record);
                        vec![format!("deleted record {record}")]
                    }
                }
            }
            ConsoleCommand::Rename { record, name } => {
                if record >= self.store.len() {
                    return vec![format!("no such record {record}")];
                }
                self.store.set_name(record, name.clone());
                vec![format!("record {record} renamed to \"{name}\"")]
            }
            ConsoleCommand::SetRole { record, role } => {
                if record >= self.store.len() {
                    return vec![format!("no such record {record}")];
                }
                self.store.set_role(record, role);
                vec![format!("record {record} is now a {role}")]
            }
            ConsoleCommand::SetMinutes { role, minutes } => {
                self.thresholds.set_minutes(role, minutes);
                vec![format!("{role} minimum is now {minutes} min")]
            }
            ConsoleCommand::List => self.render_list(),
            ConsoleCommand::Export { format, path } => self.apply_export(format, path),
            ConsoleCommand::Help => vec![help_text()],
            // Quit never reaches the session; the loop handles it
            ConsoleCommand::Quit => Vec::new(),
        }
    }

    fn apply_start(&mut self, record: usize, segment: Option<usize>) -> Vec<String> {
        if record >= self.store.len() {
            return vec![format!("no such record {record}")];
        }
        let segment = match self.resolve_segment(record, segment, SegmentState::Unset) {
            Ok(segment) => segment,
            Err(message) => return vec![message],
        };
        let now = self.clock.now();
        match self.store.start_segment(record, segment, now) {
            Ok(()) => vec![format!(
                "started record {record} segment {segment} at {}",
                format_clock(now)
            )],
            Err(err) => {
                tracing::warn!(record, segment, %err, "rejected start");
                vec![err.to_string()]
            }
        }
    }

    fn apply_end(&mut self, record: usize, segment: Option<usize>) -> Vec<String> {
        if record >= self.store.len() {
            return vec![format!("no such record {record}")];
        }
        let segment = match self.resolve_segment(record, segment, SegmentState::Running) {
            Ok(segment) => segment,
            Err(message) => return vec![message],
        };
        let now = self.clock.now();
        match self.store.end_segment(record, segment, now) {
            Ok(()) => {
                let elapsed = self
                    .store
                    .get(record)
                    .and_then(|r| r.segments().get(segment))
                    .map_or(0, |s| s.elapsed_secs(now));
                vec![format!(
                    "ended record {record} segment {segment} at {} ({})",
                    format_clock(now),
                    format_duration(elapsed)
                )]
            }
            Err(err) => {
                tracing::warn!(record, segment, %err, "rejected end");
                vec![err.to_string()]
            }
        }
    }

    fn apply_export(&mut self, format: ExportFormat, path: Option<PathBuf>) -> Vec<String> {
        let now = self.clock.now();
        let rows = export_rows(self.store.records(), &self.thresholds, now);
        let content = match format {
            ExportFormat::Csv => render_csv(&rows),
            ExportFormat::Text => render_table(&rows),
        };
        let path = path.unwrap_or_else(|| self.default_export_path(format));
        match write_export(&path, &content, format == ExportFormat::Csv) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), rows = rows.len(), "export written");
                vec![format!("saved {}", path.display())]
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "export failed");
                vec![format!("export failed: {err:#}")]
            }
        }
    }

    /// Picks the explicit segment index, or the record's segment in the
    /// fallback state when none was given.
    fn resolve_segment(
        &self,
        record: usize,
        explicit: Option<usize>,
        fallback: SegmentState,
    ) -> Result<usize, String> {
        match explicit {
            Some(segment) if segment < self.segment_count(record) => Ok(segment),
            Some(segment) => Err(format!("no such segment {segment} on record {record}")),
            None => self
                .store
                .get(record)
                .and_then(|r| r.find_segment(fallback))
                .ok_or_else(|| match fallback {
                    SegmentState::Running => format!("record {record} has no running segment"),
                    _ => format!("record {record} has no unused segment (try 'seg {record}')"),
                }),
        }
    }

    fn segment_count(&self, record: usize) -> usize {
        self.store.get(record).map_or(0, |r| r.segments().len())
    }

    fn render_list(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut lines = vec![format!(
            "thresholds: speaker {} min, discussant {} min",
            self.thresholds.speaker_minutes, self.thresholds.discussant_minutes
        )];
        if self.store.is_empty() {
            lines.push("no records (try 'add')".to_string());
            return lines;
        }
        for (i, record) in self.store.records().iter().enumerate() {
            let name = if record.name().is_empty() {
                UNNAMED
            } else {
                record.name()
            };
            let reached = if self.thresholds.reached(record, now) {
                "yes"
            } else {
                "no"
            };
            lines.push(format!(
                "#{i} {name} ({}) total {} reached {reached}",
                record.role(),
                format_duration(record.total_secs(now)),
            ));
            for (j, segment) in record.segments().iter().enumerate() {
                let detail = match (segment.started_at(), segment.ended_at()) {
                    (None, _) => "unset".to_string(),
                    (Some(start), None) => format!(
                        "running {}.. {}",
                        format_clock(start),
                        format_duration(segment.elapsed_secs(now))
                    ),
                    (Some(start), Some(end)) => format!(
                        "ended {}..{} {}",
                        format_clock(start),
                        format_clock(end),
                        format_duration(segment.elapsed_secs(now))
                    ),
                };
                lines.push(format!("  [{j}] {detail}"));
            }
        }
        lines
    }

    /// One-line live view of the first running record, if any.
    fn status_line(&self) -> Option<String> {
        let now = self.clock.now();
        self.store
            .records()
            .iter()
            .enumerate()
            .find(|(_, record)| record.is_running())
            .map(|(i, record)| {
                let name = if record.name().is_empty() {
                    UNNAMED
                } else {
                    record.name()
                };
                format!("#{i} {name} {}", format_duration(record.total_secs(now)))
            })
    }

    fn default_export_path(&self, format: ExportFormat) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.export_dir
            .join(format!("speaking_times_{stamp}.{}", format.extension()))
    }
}

// ========== File Writing ==========

/// Writes export bytes in a single attempt; the caller reports failures
/// and never retries.
fn write_export(path: &Path, content: &str, with_bom: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let mut bytes = Vec::with_capacity(content.len() + UTF8_BOM.len());
    if with_bom {
        bytes.extend_from_slice(UTF8_BOM);
    }
    bytes.extend_from_slice(content.as_bytes());
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
