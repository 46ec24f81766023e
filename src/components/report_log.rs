use leptos::prelude::*;

use crate::game::report::Stat;
use crate::game::{LogEntry, ReportLine, Session};

/// Terminal-style transcript of submissions and evaluator replies.
#[component]
pub fn ReportLog(session: RwSignal<Session>) -> impl IntoView {
	let entries = move || {
		session.with(|s| {
			s.log()
				.iter()
				.map(|entry| match entry {
					LogEntry::Operator(text) => {
						view! { <p class="log-operator">{format!("> {text}")}</p> }.into_any()
					}
					LogEntry::Evaluator(report) => {
						let lines = report.lines.iter().map(report_line).collect_view();
						view! { <div class="log-report">{lines}</div> }.into_any()
					}
				})
				.collect_view()
		})
	};

	view! {
		<div class="report-log">
			<Show
				when=move || session.with(|s| !s.log().is_empty())
				fallback=|| view! { <p class="log-idle">"Awaiting simulation..."</p> }
			>
				{entries}
			</Show>
		</div>
	}
}

fn report_line(line: &ReportLine) -> AnyView {
	match line {
		ReportLine::Header => view! { <h4 class="report-header">{line.to_string()}</h4> }.into_any(),
		ReportLine::Status { verdict, reason } => {
			let class = if verdict.is_success() { "report-status ok" } else { "report-status fail" };
			view! {
				<p class=class>
					<strong>{verdict.to_string()}</strong>
					" "
					{reason.clone()}
				</p>
			}
			.into_any()
		}
		ReportLine::Blocked { attack, detail } => view! {
			<p class="report-blocked">"BLOCKED " <strong>{attack.clone()}</strong> ": " {detail.clone()}</p>
		}
		.into_any(),
		ReportLine::Breach { attack, detail } => view! {
			<p class="report-breach">"BREACH " <strong>{attack.clone()}</strong> ": " {detail.clone()}</p>
		}
		.into_any(),
		ReportLine::Stat(stat) => {
			let (label, value) = match stat {
				Stat::Integrity(v) => ("INTEGRITY".to_string(), format!("{v}%")),
				Stat::Damage(v) => ("DAMAGE".to_string(), v.to_string()),
				Stat::Result(v) => ("RESULT".to_string(), v.clone()),
				Stat::Other { label, value } => (label.clone(), value.clone()),
			};
			view! {
				<p class="report-stat">
					<span class="stat-label">{label}</span>
					<span class="stat-value">{value}</span>
				</p>
			}
			.into_any()
		}
		ReportLine::Advice(text) => view! { <p class="report-advice">"ADVICE: " {text.clone()}</p> }.into_any(),
		ReportLine::Unrecognized(text) => view! { <p class="report-raw">{text.clone()}</p> }.into_any(),
	}
}
