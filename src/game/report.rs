//! Line grammar of evaluator reports.
//!
//! Parsing never fails: each non-empty line becomes exactly one `ReportLine`,
//! and anything that does not fit the grammar is kept as `Unrecognized`.

use std::fmt;

const HEADER_MARKER: &str = "!!! MISSION REPORT !!!";
const DELIMITER: &str = "::";
const COMPLETE_VERDICT: &str = "[MISSION COMPLETE]";
const BLOCKED_MARKER: &str = "[BLOCKED]";
const BREACH_MARKER: &str = "[BREACH]";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
	Complete,
	/// Any other status token, kept verbatim.
	Failed(String),
}

impl Verdict {
	fn from_token(token: &str) -> Self {
		if token == COMPLETE_VERDICT {
			Verdict::Complete
		} else {
			Verdict::Failed(token.to_string())
		}
	}

	pub fn is_success(&self) -> bool {
		matches!(self, Verdict::Complete)
	}
}

impl fmt::Display for Verdict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Verdict::Complete => f.write_str(COMPLETE_VERDICT),
			Verdict::Failed(token) => f.write_str(token),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stat {
	Integrity(u32),
	Damage(u32),
	Result(String),
	Other { label: String, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportLine {
	Header,
	Status { verdict: Verdict, reason: String },
	Blocked { attack: String, detail: String },
	Breach { attack: String, detail: String },
	Stat(Stat),
	Advice(String),
	Unrecognized(String),
}

impl ReportLine {
	/// Classifies one line. Returns `None` for blank lines.
	pub fn parse(line: &str) -> Option<Self> {
		let line = line.trim();
		if line.is_empty() {
			return None;
		}
		if line.contains(HEADER_MARKER) {
			return Some(ReportLine::Header);
		}

		let mut fields = line.splitn(3, DELIMITER).map(str::trim);
		let head = fields.next().unwrap_or_default();
		let second = fields.next();
		let rest = fields.next().unwrap_or_default().to_string();

		let parsed = match (head, second) {
			("STATUS", Some(verdict)) => ReportLine::Status {
				verdict: Verdict::from_token(verdict),
				reason: rest,
			},
			("[BLOCKED]", Some(attack)) => ReportLine::Blocked {
				attack: attack.to_string(),
				detail: rest,
			},
			("[BREACH]", Some(attack)) => ReportLine::Breach {
				attack: attack.to_string(),
				detail: rest,
			},
			("STATS", Some(label)) => ReportLine::Stat(parse_stat(label, rest)),
			("ADVICE", Some(advice)) => {
				// Advice may itself contain the delimiter.
				let text = line.splitn(2, DELIMITER).nth(1).unwrap_or(advice);
				ReportLine::Advice(text.trim().to_string())
			}
			_ => loose_outcome(line).unwrap_or_else(|| ReportLine::Unrecognized(line.to_string())),
		};
		Some(parsed)
	}
}

/// Outcome lines that open with their marker but skip the delimiters, e.g.
/// `[BREACH] Zero-Day bypassed defenses (-30)`. The attack is left blank and
/// the rest of the line becomes the detail.
fn loose_outcome(line: &str) -> Option<ReportLine> {
	let free_text = |rest: &str| {
		rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace())
			.trim_end()
			.to_string()
	};
	if let Some(rest) = line.strip_prefix(BREACH_MARKER) {
		return Some(ReportLine::Breach {
			attack: String::new(),
			detail: free_text(rest),
		});
	}
	line.strip_prefix(BLOCKED_MARKER).map(|rest| ReportLine::Blocked {
		attack: String::new(),
		detail: free_text(rest),
	})
}

fn parse_stat(label: &str, value: String) -> Stat {
	match label {
		"INTEGRITY" => leading_number(&value)
			.map(Stat::Integrity)
			.unwrap_or(Stat::Other {
				label: label.to_string(),
				value,
			}),
		"DAMAGE" => leading_number(&value)
			.map(Stat::Damage)
			.unwrap_or(Stat::Other {
				label: label.to_string(),
				value,
			}),
		"RESULT" => Stat::Result(value),
		_ => Stat::Other {
			label: label.to_string(),
			value,
		},
	}
}

/// Digits at the start of `value`, so `85%` still reads as 85.
fn leading_number(value: &str) -> Option<u32> {
	let end = value
		.char_indices()
		.find(|(_, c)| !c.is_ascii_digit())
		.map_or(value.len(), |(i, _)| i);
	value[..end].parse().ok()
}

impl fmt::Display for ReportLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ReportLine::Header => f.write_str(HEADER_MARKER),
			ReportLine::Status { verdict, reason } => write!(f, "STATUS :: {verdict} :: {reason}"),
			ReportLine::Blocked { attack, detail } if attack.is_empty() => {
				write!(f, "{BLOCKED_MARKER} {detail}")
			}
			ReportLine::Blocked { attack, detail } => write!(f, "{BLOCKED_MARKER} :: {attack} :: {detail}"),
			ReportLine::Breach { attack, detail } if attack.is_empty() => {
				write!(f, "{BREACH_MARKER} {detail}")
			}
			ReportLine::Breach { attack, detail } => write!(f, "{BREACH_MARKER} :: {attack} :: {detail}"),
			ReportLine::Stat(Stat::Integrity(v)) => write!(f, "STATS :: INTEGRITY :: {v}"),
			ReportLine::Stat(Stat::Damage(v)) => write!(f, "STATS :: DAMAGE :: {v}"),
			ReportLine::Stat(Stat::Result(v)) => write!(f, "STATS :: RESULT :: {v}"),
			ReportLine::Stat(Stat::Other { label, value }) => write!(f, "STATS :: {label} :: {value}"),
			ReportLine::Advice(text) => write!(f, "ADVICE :: {text}"),
			ReportLine::Unrecognized(text) => f.write_str(text),
		}
	}
}

/// A whole evaluator reply, one entry per non-blank line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
	pub lines: Vec<ReportLine>,
	raw: String,
}

impl Report {
	pub fn parse(text: &str) -> Self {
		Self {
			lines: text.lines().filter_map(ReportLine::parse).collect(),
			raw: text.to_string(),
		}
	}

	/// A report written locally rather than read off the wire.
	pub fn from_lines(lines: Vec<ReportLine>) -> Self {
		let mut report = Self {
			lines,
			raw: String::new(),
		};
		report.raw = report.to_string();
		report
	}

	/// Stand-in for a reply that never arrived.
	pub fn from_error(err: &impl fmt::Display) -> Self {
		let raw = err.to_string();
		Self {
			lines: vec![ReportLine::Unrecognized(raw.clone())],
			raw,
		}
	}

	/// The reply exactly as the evaluator wrote it.
	pub fn raw(&self) -> &str {
		&self.raw
	}

	pub fn verdict(&self) -> Option<(&Verdict, &str)> {
		self.lines.iter().find_map(|line| match line {
			ReportLine::Status { verdict, reason } => Some((verdict, reason.as_str())),
			_ => None,
		})
	}

	/// The first integrity figure in the report, if any.
	pub fn integrity(&self) -> Option<u32> {
		self.lines.iter().find_map(|line| match line {
			ReportLine::Stat(Stat::Integrity(v)) => Some(*v),
			_ => None,
		})
	}

	pub fn has_breach(&self) -> bool {
		self.lines.iter().any(|l| matches!(l, ReportLine::Breach { .. }))
	}

	pub fn blocked_details(&self) -> impl Iterator<Item = &str> {
		self.lines.iter().filter_map(|line| match line {
			ReportLine::Blocked { detail, .. } => Some(detail.as_str()),
			_ => None,
		})
	}
}

impl fmt::Display for Report {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, line) in self.lines.iter().enumerate() {
			if i > 0 {
				writeln!(f)?;
			}
			write!(f, "{line}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_every_line_kind() {
		let text = "\
!!! MISSION REPORT !!!
STATUS :: [MISSION FAILED] :: You forgot Encryption.
[BLOCKED] :: DDoS Attack (Volumetric) :: Auto-mitigated by Load Balancer
[BREACH] :: Zero-Day Ransomware :: Encrypted Main DB (-25 Damage)

STATS :: INTEGRITY :: 75
STATS :: DAMAGE :: 25
STATS :: RESULT :: SURVIVED
ADVICE :: Install EDR :: soon.
The simulation grid hums.";
		let report = Report::parse(text);
		assert_eq!(
			report.lines,
			vec![
				ReportLine::Header,
				ReportLine::Status {
					verdict: Verdict::Failed("[MISSION FAILED]".into()),
					reason: "You forgot Encryption.".into(),
				},
				ReportLine::Blocked {
					attack: "DDoS Attack (Volumetric)".into(),
					detail: "Auto-mitigated by Load Balancer".into(),
				},
				ReportLine::Breach {
					attack: "Zero-Day Ransomware".into(),
					detail: "Encrypted Main DB (-25 Damage)".into(),
				},
				ReportLine::Stat(Stat::Integrity(75)),
				ReportLine::Stat(Stat::Damage(25)),
				ReportLine::Stat(Stat::Result("SURVIVED".into())),
				ReportLine::Advice("Install EDR :: soon.".into()),
				ReportLine::Unrecognized("The simulation grid hums.".into()),
			]
		);
	}

	#[test]
	fn only_exact_verdict_is_success() {
		let ok = ReportLine::parse("STATUS :: [MISSION COMPLETE] :: nice").unwrap();
		let shouty = ReportLine::parse("STATUS :: [Mission Complete] :: nice").unwrap();
		assert!(matches!(ok, ReportLine::Status { verdict: Verdict::Complete, .. }));
		assert!(matches!(shouty, ReportLine::Status { verdict: Verdict::Failed(_), .. }));
	}

	#[test]
	fn garbled_lines_degrade_gracefully() {
		let report = Report::parse("STATS :: INTEGRITY :: lots\nSTATUS\n[BLOCKED]\n   \n");
		assert_eq!(report.integrity(), None);
		assert_eq!(report.verdict(), None);
		assert!(report.blocked_details().all(str::is_empty));
		assert_eq!(report.lines.len(), 3);
	}

	#[test]
	fn outcome_markers_without_delimiters() {
		let report = Report::parse(
			"[BREACH] Zero-Day bypassed defenses (-30)\n[BLOCKED]: the WAF held\nBREACH everywhere",
		);
		assert_eq!(
			report.lines,
			vec![
				ReportLine::Breach {
					attack: String::new(),
					detail: "Zero-Day bypassed defenses (-30)".into(),
				},
				ReportLine::Blocked {
					attack: String::new(),
					detail: "the WAF held".into(),
				},
				ReportLine::Unrecognized("BREACH everywhere".into()),
			]
		);
		assert!(report.has_breach());
		assert_eq!(report.blocked_details().collect::<Vec<_>>(), vec!["the WAF held"]);
	}

	#[test]
	fn integrity_accepts_trailing_units() {
		assert_eq!(Report::parse("STATS :: INTEGRITY :: 85%").integrity(), Some(85));
		assert_eq!(Report::parse("STATS :: INTEGRITY :: -5").integrity(), None);
	}

	#[test]
	fn error_becomes_single_line() {
		let report = Report::from_error(&"Error: API Key is missing.");
		assert_eq!(report.to_string(), "Error: API Key is missing.");
		assert!(!report.has_breach());
		assert_eq!(report.integrity(), None);
	}

	#[test]
	fn rendered_lines_parse_back() {
		let line = ReportLine::Breach {
			attack: "Ransomware".into(),
			detail: "No backup (-25 Damage)".into(),
		};
		assert_eq!(ReportLine::parse(&line.to_string()), Some(line));

		let loose = ReportLine::Breach {
			attack: String::new(),
			detail: "bypassed defenses (-30)".into(),
		};
		assert_eq!(loose.to_string(), "[BREACH] bypassed defenses (-30)");
		assert_eq!(ReportLine::parse(&loose.to_string()), Some(loose));
	}
}
