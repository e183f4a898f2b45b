//! Landing page served at `/`.
//!
//! A single form: the visitor types a target address and the page opens
//! `<proxy origin>/<encodeURIComponent(target)>` in a new tab.

use crate::config::LandingConfig;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <link href="https://cdnjs.cloudflare.com/ajax/libs/materialize/1.0.0/css/materialize.min.css" rel="stylesheet">
  <title>{{title}}</title>
  <link rel="icon" type="image/png" href="{{icon_url}}">
  <meta name="viewport" content="width=device-width,initial-scale=1.0,user-scalable=no">
  <style>
    body,html{height:100%;margin:0}
    .background{background:#eceff1 {{background}} center/cover;height:100%;display:flex;align-items:center;justify-content:center}
    .card{background:rgba(255,255,255,.8);transition:.3s}
    .card:hover{background:#fff;box-shadow:0 8px 16px rgba(0,0,0,.3)}
    .input-field input[type=text]:focus+label{color:#2c3e50!important}
    .input-field input[type=text]:focus{border-bottom:1px solid #2c3e50!important;box-shadow:0 1px 0 0 #2c3e50!important}
  </style>
</head>
<body>
  <div class="background">
    <div class="container">
      <div class="row">
        <div class="col s12 m8 offset-m2 l6 offset-l3">
          <div class="card">
            <div class="card-content">
              <span class="card-title center-align">{{title}}</span>
              <form id="urlForm" onsubmit="redirectToProxy(event)">
                <div class="input-field">
                  <input type="text" id="targetUrl" placeholder="https://example.com" required>
                  <label for="targetUrl">Target address</label>
                </div>
                <button type="submit" class="btn waves-effect waves-light teal darken-2">Go</button>
              </form>
            </div>
          </div>
        </div>
      </div>
    </div>
  </div>
  <script src="https://cdnjs.cloudflare.com/ajax/libs/materialize/1.0.0/js/materialize.min.js"></script>
  <script>
    function redirectToProxy(e){
      e.preventDefault();
      const t=document.getElementById('targetUrl').value.trim();
      window.open(location.origin+'/'+encodeURIComponent(t),'_blank');
    }
  </script>
</body>
</html>
"#;

/// Render the landing page with the configured cosmetics.
pub fn render(config: &LandingConfig) -> String {
    let background = if config.background_url.is_empty() {
        String::new()
    } else {
        // <style> is raw text: entities are not decoded there, so drop
        // anything that could close the string or the element instead.
        let url: String = config
            .background_url
            .chars()
            .filter(|c| !matches!(*c, '"' | '\\' | '<' | '>' | '\n' | '\r'))
            .collect();
        format!("url(\"{}\")", url)
    };

    TEMPLATE
        .replace("{{title}}", &escape_html(&config.title))
        .replace("{{icon_url}}", &escape_html(&config.icon_url))
        .replace("{{background}}", &background)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
