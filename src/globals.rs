use std::time::Duration;

pub const RECENT_LOG_WINDOW: Duration = Duration::from_secs(5);
pub const BANNER_INTERVAL: Duration = Duration::from_secs(5);

pub const DEFAULT_SERVERLIST_URL: &str =
    "https://raw.githubusercontent.com/rockisch/mhf-launcher/master/serverlist.json";
pub const DEFAULT_MESSAGELIST_URL: &str =
    "https://raw.githubusercontent.com/rockisch/mhf-launcher/master/messagelist.json";

/// Banners shown while the selected server delivers none of its own.
pub const FALLBACK_BANNERS: [(&str, &str); 5] = [
    ("banners/fallback-1.png", "https://github.com/rockisch/mhf-launcher"),
    ("banners/fallback-2.png", "https://github.com/rockisch/mhf-launcher"),
    ("banners/fallback-3.png", "https://github.com/rockisch/mhf-launcher"),
    ("banners/fallback-4.png", "https://github.com/rockisch/mhf-launcher"),
    ("banners/fallback-5.png", "https://github.com/rockisch/mhf-launcher"),
];
