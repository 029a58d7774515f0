//! VCD loader for reading back a recorded bench waveform.
//!
//! Parses the subset of IEEE 1364 VCD that [`VcdRecorder`](crate::VcdRecorder)
//! writes: `$timescale`, nested `$scope`/`$upscope`, `$var`, `$dumpvars`,
//! `#time` stamps, and two-state scalar or `b`-prefixed vector changes.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use muxbench_common::{Bits, Timescale};
use thiserror::Error;

/// Errors that can occur while loading a VCD file.
#[derive(Debug, Error)]
pub enum VcdLoadError {
    /// An I/O error occurred while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A parse error at a specific line number.
    #[error("parse error at line {line}: {message}")]
    ParseError {
        /// The 1-based line number where the error occurred.
        line: usize,
        /// Description of the error.
        message: String,
    },
    /// The VCD file has a structural format error.
    #[error("format error: {0}")]
    FormatError(String),
}

/// Metadata for a signal found in the VCD file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VcdSignalDef {
    /// The VCD identifier code.
    pub id_code: String,
    /// The hierarchical signal name (dotted path from the scope stack).
    pub name: String,
    /// Bit width of the signal.
    pub width: u32,
}

/// A fully loaded waveform.
#[derive(Clone, Debug)]
pub struct LoadedWaveform {
    /// The timescale from the header (1ns if absent).
    pub timescale: Timescale,
    /// Signal definitions in declaration order.
    pub signals: Vec<VcdSignalDef>,
    /// Per-signal `(tick, value)` histories, parallel to `signals`.
    pub histories: Vec<Vec<(u64, Bits)>>,
    /// The last timestamp in the file.
    pub end_time: u64,
}

impl LoadedWaveform {
    /// Returns every distinct timestamp at which some signal changed, ascending.
    pub fn change_times(&self) -> Vec<u64> {
        let mut times: Vec<u64> = self
            .histories
            .iter()
            .flat_map(|h| h.iter().map(|(t, _)| *t))
            .collect();
        times.sort_unstable();
        times.dedup();
        times
    }

    /// Returns the value of signal `index` at `time` (the latest change at or before it).
    pub fn value_at(&self, index: usize, time: u64) -> Option<Bits> {
        self.histories
            .get(index)?
            .iter()
            .take_while(|(t, _)| *t <= time)
            .last()
            .map(|(_, v)| *v)
    }
}

/// Loads a VCD waveform from a buffered reader.
pub fn load_vcd<R: BufRead>(reader: R) -> Result<LoadedWaveform, VcdLoadError> {
    let mut timescale = Timescale::default();
    let mut signals: Vec<VcdSignalDef> = Vec::new();
    let mut histories: Vec<Vec<(u64, Bits)>> = Vec::new();
    let mut id_to_idx: HashMap<String, usize> = HashMap::new();
    let mut scope_stack: Vec<String> = Vec::new();
    let mut saw_enddefinitions = false;
    let mut current_time: u64 = 0;
    let mut end_time: u64 = 0;

    // Multi-line keyword being collected, and its body so far.
    let mut pending: Option<(String, String)> = None;

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line_num = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some((kw, mut body)) = pending.take() {
            match trimmed.find("$end") {
                Some(pos) => {
                    body.push(' ');
                    body.push_str(trimmed[..pos].trim());
                    process_keyword(
                        &kw,
                        body.trim(),
                        &mut timescale,
                        &mut signals,
                        &mut histories,
                        &mut id_to_idx,
                        &mut scope_stack,
                        line_num,
                    )?;
                }
                None => {
                    body.push(' ');
                    body.push_str(trimmed);
                    pending = Some((kw, body));
                }
            }
            continue;
        }

        if !saw_enddefinitions {
            if trimmed.starts_with("$enddefinitions") {
                saw_enddefinitions = true;
                continue;
            }
            if let Some(kw) = extract_keyword(trimmed) {
                let body = extract_keyword_body(trimmed);
                if trimmed.contains("$end") {
                    process_keyword(
                        &kw,
                        &body,
                        &mut timescale,
                        &mut signals,
                        &mut histories,
                        &mut id_to_idx,
                        &mut scope_stack,
                        line_num,
                    )?;
                } else {
                    pending = Some((kw, body));
                }
            }
            continue;
        }

        if trimmed.starts_with("$dumpvars") || trimmed.starts_with("$end") {
            continue;
        }

        if let Some(time_str) = trimmed.strip_prefix('#') {
            current_time = time_str
                .parse::<u64>()
                .map_err(|_| VcdLoadError::ParseError {
                    line: line_num,
                    message: format!("invalid timestamp: {trimmed}"),
                })?;
            end_time = end_time.max(current_time);
            continue;
        }

        parse_value_change(
            trimmed,
            current_time,
            &id_to_idx,
            &signals,
            &mut histories,
            line_num,
        )?;
    }

    if !saw_enddefinitions {
        return Err(VcdLoadError::FormatError(
            "missing $enddefinitions".to_string(),
        ));
    }

    Ok(LoadedWaveform {
        timescale,
        signals,
        histories,
        end_time,
    })
}

/// Loads a VCD file from a filesystem path.
pub fn load_vcd_file(path: &Path) -> Result<LoadedWaveform, VcdLoadError> {
    let file = std::fs::File::open(path)?;
    load_vcd(std::io::BufReader::new(file))
}

/// Extracts a lowercase keyword name from a line starting with `$`.
fn extract_keyword(line: &str) -> Option<String> {
    let rest = line.strip_prefix('$')?;
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '$')
        .unwrap_or(rest.len());
    let kw = &rest[..end];
    (!kw.is_empty()).then(|| kw.to_lowercase())
}

/// Extracts the text between the keyword and `$end` on a single line.
fn extract_keyword_body(line: &str) -> String {
    let Some(pos) = line.find(char::is_whitespace) else {
        return String::new();
    };
    let after = &line[pos..];
    let body = match after.find("$end") {
        Some(end) => &after[..end],
        None => after,
    };
    body.trim().to_string()
}

/// Processes a completed header keyword with its body text.
#[allow(clippy::too_many_arguments)]
fn process_keyword(
    keyword: &str,
    body: &str,
    timescale: &mut Timescale,
    signals: &mut Vec<VcdSignalDef>,
    histories: &mut Vec<Vec<(u64, Bits)>>,
    id_to_idx: &mut HashMap<String, usize>,
    scope_stack: &mut Vec<String>,
    line_num: usize,
) -> Result<(), VcdLoadError> {
    match keyword {
        "timescale" => {
            *timescale = body.parse().map_err(|e| VcdLoadError::ParseError {
                line: line_num,
                message: format!("{e}"),
            })?;
        }
        "scope" => {
            // "module <name>"
            if let Some(name) = body.split_whitespace().last() {
                scope_stack.push(name.to_string());
            }
        }
        "upscope" => {
            scope_stack.pop();
        }
        "var" => {
            // "<type> <width> <id_code> <name>"
            let parts: Vec<&str> = body.split_whitespace().collect();
            if parts.len() < 4 {
                return Err(VcdLoadError::ParseError {
                    line: line_num,
                    message: format!("invalid $var: {body}"),
                });
            }
            let width: u32 = parts[1].parse().map_err(|_| VcdLoadError::ParseError {
                line: line_num,
                message: format!("invalid width in $var: {}", parts[1]),
            })?;
            let name = if scope_stack.is_empty() {
                parts[3].to_string()
            } else {
                format!("{}.{}", scope_stack.join("."), parts[3])
            };
            id_to_idx.insert(parts[2].to_string(), signals.len());
            signals.push(VcdSignalDef {
                id_code: parts[2].to_string(),
                name,
                width,
            });
            histories.push(Vec::new());
        }
        _ => {
            // $date, $version, $comment
        }
    }
    Ok(())
}

/// Parses one value-change line and appends it to the signal's history.
fn parse_value_change(
    line: &str,
    time: u64,
    id_to_idx: &HashMap<String, usize>,
    signals: &[VcdSignalDef],
    histories: &mut [Vec<(u64, Bits)>],
    line_num: usize,
) -> Result<(), VcdLoadError> {
    let parse_err = |message: String| VcdLoadError::ParseError {
        line: line_num,
        message,
    };

    let (digits, code) = if let Some(rest) = line.strip_prefix(['b', 'B']) {
        let mut parts = rest.split_whitespace();
        let digits = parts.next().unwrap_or_default();
        let code = parts
            .next()
            .ok_or_else(|| parse_err(format!("vector change without identifier: {line}")))?;
        (digits, code)
    } else {
        line.split_at_checked(1)
            .ok_or_else(|| parse_err(format!("invalid value change: {line}")))?
    };

    let &idx = id_to_idx
        .get(code)
        .ok_or_else(|| parse_err(format!("unknown identifier code '{code}'")))?;
    let width = signals[idx].width;

    let value = u64::from_str_radix(digits, 2)
        .map_err(|_| parse_err(format!("non two-state value '{digits}'")))?;
    let bits = Bits::new(value, width)
        .map_err(|e| parse_err(format!("{e} for '{}'", signals[idx].name)))?;
    histories[idx].push((time, bits));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
$version
  muxbench 0.1.0
$end
$timescale
  1ns
$end
$scope module d1_test $end
$var wire 8 ! a $end
$var wire 1 \" sel $end
$upscope $end
$enddefinitions $end
#0
$dumpvars
b00000000 !
0\"
$end
#5
b00111101 !
#10
1\"
#15
";

    #[test]
    fn loads_header_and_changes() {
        let wf = load_vcd(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(wf.timescale, Timescale::NS);
        assert_eq!(wf.signals.len(), 2);
        assert_eq!(wf.signals[0].name, "d1_test.a");
        assert_eq!(wf.signals[1].width, 1);
        assert_eq!(wf.histories[0].len(), 2);
        assert_eq!(wf.histories[0][1], (5, Bits::new(0x3D, 8).unwrap()));
        assert_eq!(wf.end_time, 15);
    }

    #[test]
    fn change_times_and_value_at() {
        let wf = load_vcd(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(wf.change_times(), [0, 5, 10]);
        assert_eq!(wf.value_at(0, 7).unwrap().value(), 0x3D);
        assert_eq!(wf.value_at(1, 9).unwrap().value(), 0);
        assert_eq!(wf.value_at(1, 10).unwrap().value(), 1);
        assert!(wf.value_at(5, 0).is_none());
    }

    #[test]
    fn single_line_timescale() {
        let vcd = "$timescale 10ps $end\n$enddefinitions $end\n";
        let wf = load_vcd(Cursor::new(vcd)).unwrap();
        assert_eq!(wf.timescale.to_string(), "10ps");
    }

    #[test]
    fn missing_enddefinitions() {
        let vcd = "$var wire 1 ! clk $end\n";
        assert!(matches!(
            load_vcd(Cursor::new(vcd)),
            Err(VcdLoadError::FormatError(_))
        ));
    }

    #[test]
    fn unknown_identifier() {
        let vcd = "$var wire 1 ! clk $end\n$enddefinitions $end\n#0\n1?\n";
        let err = load_vcd(Cursor::new(vcd)).unwrap_err();
        assert!(err.to_string().contains("unknown identifier code '?'"));
    }

    #[test]
    fn four_state_values_rejected() {
        let vcd = "$var wire 1 ! clk $end\n$enddefinitions $end\n#0\nx!\n";
        let err = load_vcd(Cursor::new(vcd)).unwrap_err();
        assert!(matches!(err, VcdLoadError::ParseError { line: 4, .. }));
    }

    #[test]
    fn bad_timestamp() {
        let vcd = "$enddefinitions $end\n#abc\n";
        assert!(matches!(
            load_vcd(Cursor::new(vcd)),
            Err(VcdLoadError::ParseError { line: 2, .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), SAMPLE).unwrap();
        let wf = load_vcd_file(tmp.path()).unwrap();
        assert_eq!(wf.signals.len(), 2);
    }
}
