//! Template engine setup and HTML templates.

use once_cell::sync::Lazy;
use tera::{Context, Tera};

/// Global template engine instance with embedded templates.
pub static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();

    // Embed templates directly in the binary (no external files needed)
    tera.add_raw_templates(vec![
        ("base.html", BASE_TEMPLATE),
        ("index.html", INDEX_TEMPLATE),
        ("setup.html", SETUP_TEMPLATE),
        ("success.html", SUCCESS_TEMPLATE),
        ("error.html", ERROR_TEMPLATE),
    ])
    .expect("Failed to load templates");

    tera
});

/// Render a template with context
pub fn render(template: &str, context: &Context) -> Result<String, tera::Error> {
    TEMPLATES.render(template, context)
}

// =============================================================================
// Embedded Templates
// =============================================================================

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}Telegram-Notion Setup Assistant{% endblock %}</title>
    <style>
        :root {
            --bg: #f5f5f5;
            --surface: #ffffff;
            --foreground: #1a1a1a;
            --muted: #666666;
            --border: #e2e2e2;
            --accent: #0070f3;
            --accent-hover: #0051cc;
            --danger: #dc3545;
            --success: #4caf50;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--foreground);
            line-height: 1.6;
            padding: 20px;
        }

        .container {
            max-width: 900px;
            margin: 0 auto;
            background: var(--surface);
            padding: 30px;
            border-radius: 10px;
            box-shadow: 0 2px 10px rgba(0, 0, 0, 0.1);
        }

        .header { text-align: center; margin-bottom: 30px; }
        .header p { color: var(--muted); }

        h1 { font-size: 28px; margin-bottom: 8px; }

        a { color: var(--accent); text-decoration: none; }
        a:hover { text-decoration: underline; }

        .step {
            background: #f8f9fa;
            margin: 20px 0;
            padding: 20px;
            border-radius: 8px;
            border-left: 4px solid var(--accent);
        }
        .step h3 { margin-bottom: 8px; color: var(--accent); }
        .step ol li, .step ul li { margin: 8px 0 8px 20px; }

        .form-group { margin: 15px 0; }
        .form-group label { display: block; font-weight: bold; margin-bottom: 5px; }
        .form-group input {
            width: 100%;
            padding: 10px;
            border: 1px solid var(--border);
            border-radius: 5px;
        }
        .form-group small { color: var(--muted); }

        .button {
            background: var(--accent);
            color: white;
            padding: 12px 24px;
            border: none;
            border-radius: 5px;
            cursor: pointer;
            font-size: 16px;
            display: inline-block;
            text-decoration: none;
        }
        .button:hover { background: var(--accent-hover); text-decoration: none; }
        .button.danger { background: var(--danger); }

        .alert { padding: 15px; margin: 20px 0; border-radius: 5px; }
        .alert-info { background: #e3f2fd; border-left: 4px solid #2196f3; }
        .alert-success { background: #e8f5e8; border-left: 4px solid var(--success); }
        .alert-error { background: #fdecea; border-left: 4px solid var(--danger); }

        code {
            background: #f0f0f0;
            padding: 2px 6px;
            border-radius: 3px;
            font-size: 14px;
        }

        .stats { background: #e8f5e8; padding: 15px; border-radius: 5px; margin: 20px 0; }

        .features {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(250px, 1fr));
            gap: 20px;
            margin: 30px 0;
        }
        .feature {
            background: #f8f9fa;
            padding: 20px;
            border-radius: 8px;
            border-left: 4px solid var(--accent);
        }

        .existing-user {
            background: #e8f5e8;
            padding: 20px;
            border-radius: 8px;
            margin-bottom: 20px;
        }

        .details {
            background: #f8f9fa;
            padding: 20px;
            border-radius: 8px;
            margin: 20px 0;
            text-align: left;
        }

        .footer {
            text-align: center;
            margin-top: 40px;
            color: var(--muted);
            font-size: 14px;
        }
    </style>
</head>
<body>
    <div class="container">
        {% block content %}{% endblock %}
    </div>
</body>
</html>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<div class="header">
    <h1>🤖 Telegram-Notion Setup Assistant</h1>
    <p>Connect your Telegram bot to Notion with guided setup</p>
</div>

<div class="stats">
    <strong>📊 Active Users:</strong> {{ user_count }} connected integrations
</div>

<div class="features">
    <div class="feature">
        <h3>🔧 Easy Setup</h3>
        <p>Step-by-step guided process to connect your Notion workspace</p>
    </div>
    <div class="feature">
        <h3>🔒 Secure</h3>
        <p>Your integration token is verified before anything is stored</p>
    </div>
    <div class="feature">
        <h3>⚡ Instant</h3>
        <p>No approval process - start using immediately</p>
    </div>
    <div class="feature">
        <h3>🎯 Smart Tasks</h3>
        <p>AI-powered task creation from text, voice, and images</p>
    </div>
</div>

<div style="text-align: center; margin-top: 30px;">
    <h3>Get Started</h3>
    <p>Go to your Telegram bot and type <code>/setup</code> to begin!</p>
</div>

<div class="footer">
    <p>Powered by Axum • Notion API • SQLite</p>
</div>
{% endblock %}"##;

const SETUP_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}Notion Integration Setup{% endblock %}

{% block content %}
<div class="header">
    <h1>🔗 Set Up Your Notion Integration</h1>
    <p><strong>Telegram ID:</strong> {{ telegram_id }}</p>
</div>

{% if error %}
<div class="alert alert-error">{{ error }}</div>
{% endif %}
{% if message %}
<div class="alert alert-success">{{ message }}</div>
{% endif %}

{% if existing_workspace %}
<div class="existing-user">
    <h3>✅ Integration Already Configured</h3>
    <p><strong>Workspace:</strong> {{ existing_workspace }}</p>
    <p><strong>Connected:</strong> {{ existing_connected_at }}</p>
    <p><strong>Token:</strong> <code>{{ existing_token }}</code></p>
    <p>Your integration is working! You can create tasks in Telegram.</p>
    <form method="post" action="/disconnect/{{ telegram_id }}" style="margin-top: 15px;">
        <button type="submit" class="button danger"
                onclick="return confirm('Are you sure you want to disconnect?')">
            Disconnect Integration
        </button>
    </form>
</div>
{% endif %}

<div class="step">
    <h3>📋 Before You Start</h3>
    <p>Make sure you have a Notion database with these exact properties:</p>
    <ul>
        <li><strong>Name</strong> (Title)</li>
        <li><strong>Start at</strong> (Date)</li>
        <li><strong>Finish at</strong> (Date)</li>
        <li><strong>Priority</strong> (Multi-select: Urgent, High, Long-term)</li>
        <li><strong>Progress</strong> (Status: Not Started, Doing, Paused, Done)</li>
    </ul>
    <p>Need help? <a href="https://www.notion.so/templates/task-database" target="_blank">Use this Notion template</a></p>
</div>

<div class="step">
    <h3>Step 1: Create Internal Integration</h3>
    <ol>
        <li>Go to <a href="https://www.notion.so/profile/integrations" target="_blank">Notion Integrations</a></li>
        <li>Click <strong>"New Integration"</strong></li>
        <li>Choose <strong>"Internal"</strong> (not Public)</li>
        <li>Name: <code>Telegram Task Manager</code></li>
        <li>Select your workspace</li>
        <li>Click <strong>"Submit"</strong></li>
    </ol>
</div>

<div class="step">
    <h3>Step 2: Copy Integration Token</h3>
    <ol>
        <li>In your integration page, find the <strong>"Internal Integration Token"</strong></li>
        <li>Click <strong>"Show"</strong> then <strong>"Copy"</strong></li>
        <li>The token starts with <code>secret_</code></li>
    </ol>
</div>

<div class="step">
    <h3>Step 3: Share Your Database</h3>
    <ol>
        <li>Go to your Notion task database</li>
        <li>Click the <strong>"..."</strong> menu (top right)</li>
        <li>Select <strong>"Add connections"</strong></li>
        <li>Find and select <strong>"Telegram Task Manager"</strong></li>
        <li>Click <strong>"Confirm"</strong></li>
    </ol>
</div>

<div class="step">
    <h3>Step 4: Complete Setup</h3>
    <form method="post" action="/verify/{{ telegram_id }}">
        <div class="form-group">
            <label for="token">Integration Token:</label>
            <input type="text" id="token" name="token" placeholder="secret_..." required>
            <small>Paste the token from your Notion integration</small>
        </div>

        <div class="form-group">
            <label for="database_id">Database ID:</label>
            <input type="text" id="database_id" name="database_id" placeholder="32-character database ID" required>
            <small>Copy from your database URL: notion.so/workspace/DATABASE_ID?v=...</small>
        </div>

        <div class="form-group">
            <label for="user_name">Your Name (optional):</label>
            <input type="text" id="user_name" name="user_name" placeholder="Your name">
        </div>

        <button type="submit" class="button">🚀 Complete Setup</button>
    </form>
</div>

<div class="alert alert-info">
    <strong>💡 Need Help?</strong> If you encounter issues, check that:
    <ul>
        <li>Your database has all required properties</li>
        <li>You copied the full integration token</li>
        <li>You shared the database with your integration</li>
        <li>Database ID is the 32-character code from the URL</li>
    </ul>
</div>
{% endblock %}"##;

const SUCCESS_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}Setup Complete!{% endblock %}

{% block content %}
<div class="header" style="margin-top: 20px;">
    <div style="font-size: 48px;">✅</div>
    <h1>Setup Complete!</h1>
    <p>Your Notion integration is now connected and working perfectly.</p>
</div>

<div class="details">
    <h3>📋 Connection Details:</h3>
    <p><strong>User:</strong> {{ user_name }}</p>
    <p><strong>Workspace:</strong> {{ workspace_name }}</p>
    <p><strong>Database:</strong> {{ database_title }}</p>
    <p><strong>Test Page:</strong> Created successfully ✅</p>
</div>

<h3 style="text-align: center;">🚀 Next Steps:</h3>
<ol style="max-width: 400px; margin: 0 auto;">
    <li>Return to your Telegram bot</li>
    <li>Try sending a message like "Buy groceries tomorrow"</li>
    <li>Check your Notion database for the new task!</li>
    <li>You can delete the test page at any time</li>
</ol>

<p style="text-align: center; margin-top: 30px;">
    <strong>You can now close this window and return to Telegram.</strong>
</p>

<div class="footer">
    <p>Need help? Contact support or check the documentation.</p>
</div>
{% endblock %}"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}Page Not Found{% endblock %}

{% block content %}
<div class="header" style="margin-top: 20px;">
    <h1>404 - Page Not Found</h1>
    <p>{{ message }}</p>
    <p><a href="/">← Go Home</a></p>
</div>
{% endblock %}"##;
