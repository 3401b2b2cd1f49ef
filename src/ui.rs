use crate::models::CounterState;

// Event text goes in last so placeholders typed into it stay literal.
pub fn render_index(state: &CounterState, clicked: bool) -> String {
    INDEX_HTML
        .replace("{{COUNT}}", &state.count.to_string())
        .replace("{{COUNT_LABEL}}", &count_label(state.count))
        .replace("{{CLICKED}}", if clicked { "true" } else { "false" })
        .replace("{{EVENT_TEXT}}", &escape_html(&state.event_text))
}

pub fn count_label(count: u64) -> String {
    let people = if count == 1 { "person" } else { "people" };
    format!("{count} {people} will be there.")
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Be There</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(560px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 22px;
      text-align: center;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
      margin: 0;
    }

    #count {
      font-size: 1.3rem;
      margin: 0;
    }

    #status {
      color: #5f5c57;
      margin: 0;
      min-height: 1.4em;
    }

    #be-there {
      border: none;
      border-radius: 999px;
      padding: 16px 28px;
      font-size: 1.1rem;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    #be-there[disabled] {
      filter: grayscale(0.2);
      cursor: not-allowed;
      opacity: 0.7;
    }

    details {
      text-align: left;
      border-top: 1px solid rgba(47, 72, 88, 0.15);
      padding-top: 12px;
    }

    details form {
      display: grid;
      gap: 10px;
      margin-top: 12px;
    }

    details input[type="text"],
    details input[type="password"] {
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.3);
    }

    details button {
      justify-self: start;
      border: none;
      border-radius: 10px;
      padding: 8px 16px;
      background: var(--accent-2);
      color: white;
    }
  </style>
</head>
<body>
  <main class="app" id="app" data-count="{{COUNT}}" data-clicked="{{CLICKED}}">
    <h1 id="event-text">{{EVENT_TEXT}}</h1>
    <p id="count">{{COUNT_LABEL}}</p>
    <button id="be-there" type="button">Be There</button>
    <p id="status"></p>

    <details>
      <summary>Admin</summary>
      <form id="admin-form">
        <input id="admin-password" type="password" placeholder="Password" required />
        <input id="admin-text" type="text" placeholder="New event text (optional)" />
        <label><input id="admin-reset" type="checkbox" /> Reset counter</label>
        <button type="submit">Apply</button>
        <p id="admin-status"></p>
      </form>
    </details>
  </main>

  <script>
    const CLICK_KEY = 'be_there_clicked_v1';
    const app = document.getElementById('app');
    const countEl = document.getElementById('count');
    const statusEl = document.getElementById('status');
    const textEl = document.getElementById('event-text');
    const buttonEl = document.getElementById('be-there');
    const adminStatus = document.getElementById('admin-status');
    let inFlight = false;

    const localClicked = () => localStorage.getItem(CLICK_KEY) === 'true';

    const updateCount = (n) => {
      countEl.textContent = `${n} ${n === 1 ? 'person' : 'people'} will be there.`;
    };

    const setClicked = (clicked) => {
      if (clicked) {
        statusEl.textContent = 'You have clicked the Be There Button. Please do not click the button again...';
        buttonEl.setAttribute('disabled', 'true');
      } else {
        statusEl.textContent = 'You have not clicked the Be There Button.';
        buttonEl.removeAttribute('disabled');
      }
    };

    const voteHeaders = () => (localClicked() ? { 'x-be-there-clicked': 'true' } : {});

    const render = (data) => {
      updateCount(data.count ?? 0);
      if (typeof data.eventText === 'string') {
        textEl.textContent = data.eventText;
      }
      if (!data.clicked) {
        localStorage.removeItem(CLICK_KEY);
      }
      setClicked(Boolean(data.clicked));
    };

    const load = async () => {
      const res = await fetch('/api/state', { cache: 'no-store', headers: voteHeaders() });
      if (!res.ok) {
        throw new Error('Unable to load');
      }
      render(await res.json());
    };

    buttonEl.addEventListener('click', async () => {
      if (inFlight || buttonEl.hasAttribute('disabled')) {
        return;
      }
      inFlight = true;
      buttonEl.setAttribute('disabled', 'true');
      try {
        const res = await fetch('/api/increment', { method: 'POST', headers: voteHeaders() });
        if (!res.ok) {
          throw new Error('Failed to increment');
        }
        const data = await res.json();
        updateCount(data.count ?? 0);
        localStorage.setItem(CLICK_KEY, 'true');
        setClicked(true);
      } catch (err) {
        statusEl.textContent = 'Error submitting. Please try again.';
        buttonEl.removeAttribute('disabled');
      } finally {
        inFlight = false;
      }
    });

    document.getElementById('admin-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const payload = { password: document.getElementById('admin-password').value };
      const text = document.getElementById('admin-text').value.trim();
      if (text) {
        payload.eventText = text;
      }
      payload.resetCount = document.getElementById('admin-reset').checked;

      const res = await fetch('/api/admin', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(payload)
      });
      if (res.status === 401) {
        adminStatus.textContent = 'Wrong password.';
        return;
      }
      if (!res.ok) {
        adminStatus.textContent = 'Admin update failed.';
        return;
      }
      const data = await res.json();
      adminStatus.textContent = 'Saved.';
      if (payload.resetCount) {
        localStorage.removeItem(CLICK_KEY);
      }
      load().catch(() => render({ count: data.count, eventText: data.eventText, clicked: false }));
    });

    setClicked(app.dataset.clicked === 'true' || localClicked());
    load().catch(() => {
      statusEl.textContent = 'Unable to load. Please refresh.';
    });
    setInterval(() => load().catch(() => {}), 5000);
  </script>
</body>
</html>
"#;
