//! HTML page for the form front end.

use crate::emotion::EMOTION_LABELS;

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <title>Voice cloning with emotion control</title>
  <meta name="viewport" content="width=device-width,initial-scale=1"/>
  <style>
    body{font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif;padding:2rem;max-width:920px;margin:auto}
    .card{border:1px solid #e5e7eb;border-radius:14px;padding:1.25rem;margin-bottom:1rem;box-shadow:0 1px 6px rgba(0,0,0,.04)}
    label{display:block;margin:.5rem 0 .25rem 0;font-weight:600}
    input[type="text"],textarea,input[type="number"]{width:100%;padding:.65rem;border-radius:10px;border:1px solid #cbd5e1}
    input[type="file"]{margin:.25rem 0 1rem 0}
    button{background:#111827;color:#fff;border:none;border-radius:12px;padding:.7rem 1.1rem;cursor:pointer}
    .row,.grid2{display:grid;grid-template-columns:1fr 1fr;gap:16px}
    .hint{color:#6b7280;font-size:.9rem}
    .footer{color:#6b7280;margin-top:2rem;font-size:.85rem}
    audio{width:100%}
    .sliderwrap{display:flex;gap:12px;align-items:center}
    input[type="range"]{width:100%}
  </style>
</head>
<body>
  <h1>Voice cloning with emotion control</h1>

  <div class="card">
    <form action="/synthesize" method="post" enctype="multipart/form-data">
      <div class="row">
        <div>
          <label>Speaker reference audio (required)</label>
          <input type="file" name="ref_audio" accept="{{accept}}" required>
          <div class="hint">The voice to clone. 3 to 10 seconds of clean speech works best.</div>
        </div>
        <div>
          <label>Emotion reference audio (optional)</label>
          <input type="file" name="emo_audio" accept="{{accept}}">
          <div class="hint">Borrows tone and mood from a second clip.</div>
        </div>
      </div>

      <label>Text to speak</label>
      <textarea name="text" rows="3" required></textarea>

      <div class="grid2">
        <div>
          <label>Emotion weight (emo_alpha: 0.0 to 1.0)</label>
          <div class="sliderwrap">
            <input type="range" min="0" max="1" step="0.05" value="1.0" name="emo_alpha_range">
            <input type="number" min="0" max="1" step="0.01" value="1.0" name="emo_alpha_number">
          </div>
          <div class="hint">Higher follows the emotion reference more closely; 0 ignores it.</div>
        </div>
        <div>
          <label>use_random (random emotion sampling)</label>
          <select name="use_random">
            <option value="false" selected>false</option>
            <option value="true">true</option>
          </select>
          <div class="hint">Lowers speaker similarity.</div>
        </div>
      </div>

      <label>8-dimension emotion vector (comma separated)</label>
      <input type="text" name="emo_vector" placeholder="0,0,0,0,0,0,0.45,0">
      <div class="hint">Order: [{{labels}}]. Leave empty to skip.</div>

      <div class="grid2">
        <div>
          <label>use_emo_text (infer emotion from text)</label>
          <select name="use_emo_text">
            <option value="false" selected>false</option>
            <option value="true">true</option>
          </select>
        </div>
        <div>
          <label>Emotion text (emo_text, optional)</label>
          <input type="text" name="emo_text">
          <div class="hint">Describes the emotion separately from the spoken text when use_emo_text is on.</div>
        </div>
      </div>

      <div style="margin-top:1rem">
        <button type="submit">Generate</button>
      </div>
    </form>
  </div>
{{flash}}{{result}}
  <div class="footer">The first request may take a while as the model loads.</div>
  <script>
    const emoRange = document.querySelector('input[name="emo_alpha_range"]');
    const emoNum = document.querySelector('input[name="emo_alpha_number"]');
    emoRange.addEventListener('input', () => emoNum.value = emoRange.value);
    emoNum.addEventListener('input', () => {
      let v = parseFloat(emoNum.value);
      if (isNaN(v)) v = 1.0;
      v = Math.max(0, Math.min(1, v));
      emoNum.value = v.toFixed(2);
      emoRange.value = v.toFixed(2);
    });
  </script>
</body>
</html>
"#;

/// Render the page, optionally with a message card and a result player.
pub fn render(flash: Option<&str>, audio_url: Option<&str>) -> String {
    let flash_card = match flash {
        Some(message) if !message.is_empty() => format!(
            "\n  <div class=\"card flash\">\n    <div>{}</div>\n  </div>\n",
            escape_html(message)
        ),
        _ => String::new(),
    };

    let result_card = match audio_url {
        Some(url) => {
            let url = escape_html(url);
            format!(
                "\n  <div class=\"card\">\n    <h3>Result</h3>\n    \
                 <audio controls src=\"{url}\"></audio>\n    \
                 <p><a href=\"{url}\" download>Download WAV</a></p>\n  </div>\n"
            )
        }
        None => String::new(),
    };

    let accept = crate::request::ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");

    let labels = EMOTION_LABELS.join(", ");
    fill(
        PAGE_TEMPLATE,
        &[
            ("{{accept}}", accept.as_str()),
            ("{{labels}}", labels.as_str()),
            ("{{flash}}", flash_card.as_str()),
            ("{{result}}", result_card.as_str()),
        ],
    )
}

/// Substitute placeholders in one pass; inserted text is never rescanned.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match slots.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push_str("{{");
                rest = &tail[2..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
