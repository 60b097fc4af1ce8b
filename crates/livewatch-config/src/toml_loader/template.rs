//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Livewatch Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# Secrets can also come from the environment:
#   TWITCH_CLIENT_ID, TWITCH_CLIENT_SECRET, DISCORD_TOKEN, REDIS_ADDR

[poller]
# interval_secs = 300         # 60-86400
# initial_delay_secs = 10     # 0-3600
# batch_size = 100            # 1-100
# shutdown_timeout_secs = 10  # 1-300

[dispatch]
# max_in_flight = 64          # 1-4096
# drain_timeout_secs = 10     # 1-300
# footer = "Livewatch Live Notifications"
# accent_color = 9520895      # 0x9146FF

[cache]
# backend = "memory"          # memory, redis
# redis_url = "redis://127.0.0.1:6379/0"
# ttl_secs = 86400            # 60-604800
# key_prefix = "livewatch:presence:"

[store]
# path = "livewatch.db"

[twitch]
# client_id = ""
# client_secret = ""
# api_base = "https://api.twitch.tv/helix"
# auth_url = "https://id.twitch.tv/oauth2/token"
# request_timeout_secs = 30

[discord]
# bot_token = ""
# api_base = "https://discord.com/api/v10"
# request_timeout_secs = 15

[logging]
# level = "INFO"              # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
