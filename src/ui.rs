use crate::models::{yes_no, DashboardResponse, Roster};
use crate::reset::ResetState;
use crate::scoring::{score_day, DailyInputs, MAX_DIET_MISTAKES, MIN_DIET_MISTAKES};
use crate::stats::Leaderboard;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;

pub fn render_index(roster: &Roster, dashboard: &DashboardResponse, reset: ResetState) -> String {
    // The form starts with every habit answered "Yes"; the script keeps the
    // preview in step with the selections after that.
    let preview = score_day(&DailyInputs {
        took_break: false,
        diet_ok: true,
        workout_ok: true,
        social_ok: true,
        ..DailyInputs::default()
    });

    INDEX_HTML
        .replace("{{TODAY}}", &dashboard.today.to_string())
        .replace("{{NAME_OPTIONS}}", &name_options(roster))
        .replace("{{MIN_MISTAKES}}", &MIN_DIET_MISTAKES.to_string())
        .replace("{{MAX_MISTAKES}}", &MAX_DIET_MISTAKES.to_string())
        .replace("{{PREVIEW}}", &preview.score.to_string())
        .replace("{{DAILY}}", &daily_section(dashboard))
        .replace("{{WEEKLY}}", &leaderboard_section("Weekly", &dashboard.weekly))
        .replace("{{MONTHLY}}", &leaderboard_section("Monthly", &dashboard.monthly))
        .replace("{{RESET}}", reset_section(reset))
}

fn name_options(roster: &Roster) -> String {
    let mut html = String::new();
    for name in roster.names() {
        let value = encode_double_quoted_attribute(name);
        let label = encode_text(name);
        let _ = write!(html, r#"<option value="{value}">{label}</option>"#);
    }
    html
}

fn daily_section(dashboard: &DashboardResponse) -> String {
    if dashboard.entries.is_empty() {
        return r#"<p class="empty">No entries today.</p>"#.to_string();
    }

    let mut rows = String::new();
    for entry in &dashboard.entries {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td></tr>",
            encode_text(entry.name()),
            yes_no(entry.took_break()),
            yes_no(entry.diet_ok()),
            yes_no(entry.workout_ok()),
            yes_no(entry.social_ok()),
            entry.score(),
        );
    }

    format!(
        "<table><thead><tr><th>Name</th><th>Break</th><th>Diet</th><th>Workout</th><th>Social</th><th class=\"num\">Score</th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

fn leaderboard_section(label: &str, board: &Leaderboard) -> String {
    let mut html = format!(
        r#"<p class="range">{label} range: {} &rarr; {}</p>"#,
        board.start_date, board.end_date
    );

    if board.standings.is_empty() {
        html.push_str(r#"<p class="empty">No scores yet.</p>"#);
        return html;
    }

    html.push_str(r#"<table><thead><tr><th>Name</th><th class="num">Score</th></tr></thead><tbody>"#);
    for standing in &board.standings {
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td class="num">{}</td></tr>"#,
            encode_text(&standing.name),
            standing.score
        );
    }
    html.push_str("</tbody></table>");

    if let Some(winner) = board.winner() {
        let _ = write!(
            html,
            r#"<div class="winner-box">&#127942; {label} Winner: {} ({} points)</div>"#,
            encode_text(&winner.name),
            winner.score
        );
    }
    html
}

fn reset_section(reset: ResetState) -> &'static str {
    if reset.is_pending() {
        r#"<p class="warning">This deletes every saved score. Are you sure?</p>
      <div class="actions">
        <form method="post" action="/reset/confirm"><button class="danger" type="submit">Yes, reset everything</button></form>
        <form method="post" action="/reset/cancel"><button class="ghost" type="submit">Cancel</button></form>
      </div>"#
    } else {
        r#"<form method="post" action="/reset/request"><button class="ghost" type="submit">Reset all scores</button></form>"#
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Habit Tracker</title>
  <style>
    :root {
      --bg: #f4f0fb;
      --ink: #2b2a33;
      --accent: #5a2ea6;
      --accent-soft: #e5d7ff;
      --card: #ffffff;
      --danger: #c0392b;
      --shadow: 0 18px 48px rgba(90, 46, 166, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(760px, 100%);
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      text-align: center;
      color: var(--accent);
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    section {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    h2 {
      margin: 0 0 14px;
      font-size: 1.3rem;
    }

    form.entry {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 14px;
    }

    label {
      display: grid;
      gap: 6px;
      font-weight: 600;
    }

    select,
    input {
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid #cfc4e6;
      font: inherit;
    }

    button {
      padding: 10px 18px;
      border-radius: 12px;
      border: none;
      background: var(--accent);
      color: #fff;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
    }

    button.ghost {
      background: transparent;
      color: var(--accent);
      border: 1px solid var(--accent);
    }

    button.danger {
      background: var(--danger);
    }

    .preview {
      font-size: 1.2rem;
      font-weight: 600;
      margin: 16px 0 0;
    }

    .status {
      min-height: 1.2em;
      margin: 8px 0 0;
    }

    .status.ok {
      color: #1e7d4f;
    }

    .status.error {
      color: var(--danger);
    }

    .hidden {
      display: none;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th,
    td {
      text-align: left;
      padding: 8px 6px;
      border-bottom: 1px solid #eee8f7;
    }

    .num {
      text-align: right;
    }

    .range,
    .empty {
      color: #6a6475;
    }

    .winner-box {
      padding: 12px;
      margin-top: 12px;
      background: var(--accent-soft);
      border-left: 6px solid var(--accent);
      border-radius: 6px;
      font-size: 1.05rem;
      font-weight: 600;
    }

    .actions {
      display: flex;
      gap: 12px;
    }

    .warning {
      color: var(--danger);
      font-weight: 600;
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>&#127942; Daily Habit Score Tracker</h1>

    <section>
      <h2>Submit Today's Update <small>({{TODAY}})</small></h2>
      <form id="entry-form" class="entry" method="post" action="/submit">
        <label>Name
          <select name="name">{{NAME_OPTIONS}}</select>
        </label>
        <label>Diet
          <select name="diet"><option>Yes</option><option>No</option></select>
        </label>
        <label>Workout
          <select name="workout"><option>Yes</option><option>No</option></select>
        </label>
        <label>Social Media
          <select name="social"><option>Yes</option><option>No</option></select>
        </label>
        <label id="break-field" class="hidden">Break Today?
          <select name="took_break"><option>No</option><option>Yes</option></select>
        </label>
        <label id="mistakes-field" class="hidden">How many diet mistakes?
          <input name="diet_mistakes" type="number" min="{{MIN_MISTAKES}}" max="{{MAX_MISTAKES}}" value="{{MIN_MISTAKES}}" />
        </label>
        <div><button type="submit">Submit</button></div>
      </form>
      <p class="preview">Today's Score: <span id="preview">{{PREVIEW}}</span></p>
      <p id="status" class="status" role="status"></p>
    </section>

    <section>
      <h2>Daily Summary</h2>
      {{DAILY}}
    </section>

    <section>
      <h2>Weekly Summary (Calendar Week)</h2>
      {{WEEKLY}}
    </section>

    <section>
      <h2>Monthly Summary (Calendar Month)</h2>
      {{MONTHLY}}
    </section>

    <section>
      <h2>Reset</h2>
      {{RESET}}
    </section>
  </main>

  <script>
    const form = document.getElementById('entry-form');
    const previewEl = document.getElementById('preview');
    const statusEl = document.getElementById('status');
    const breakField = document.getElementById('break-field');
    const mistakesField = document.getElementById('mistakes-field');

    const setStatus = (text, tone) => {
      statusEl.textContent = text;
      statusEl.className = `status ${tone || ''}`.trim();
    };

    const readInputs = () => {
      const data = new FormData(form);
      const workoutOk = data.get('workout') === 'Yes';
      const dietOk = data.get('diet') === 'Yes';
      return {
        name: data.get('name'),
        diet_ok: dietOk,
        workout_ok: workoutOk,
        social_ok: data.get('social') === 'Yes',
        took_break: !workoutOk && data.get('took_break') === 'Yes',
        diet_mistakes: dietOk ? 1 : Number(data.get('diet_mistakes') || 1)
      };
    };

    const syncFields = () => {
      const data = new FormData(form);
      breakField.classList.toggle('hidden', data.get('workout') === 'Yes');
      const onBreak = data.get('workout') === 'No' && data.get('took_break') === 'Yes';
      mistakesField.classList.toggle('hidden', data.get('diet') === 'Yes' || onBreak);
    };

    const refreshPreview = async () => {
      syncFields();
      const res = await fetch('/api/score', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(readInputs())
      });
      if (!res.ok) {
        throw new Error(await res.text() || 'Unable to score inputs');
      }
      const result = await res.json();
      previewEl.textContent = result.score;
    };

    form.addEventListener('change', () => {
      refreshPreview().catch((err) => setStatus(err.message, 'error'));
    });

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      setStatus('Saving...', '');
      try {
        const res = await fetch('/api/submit', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify(readInputs())
        });
        if (!res.ok) {
          throw new Error(await res.text() || 'Request failed');
        }
        const record = await res.json();
        setStatus(`Update saved! ${record.name} scored ${record.score} today.`, 'ok');
        setTimeout(() => window.location.reload(), 1200);
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    syncFields();
  </script>
</body>
</html>
"#;
