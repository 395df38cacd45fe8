use chrono::NaiveDate;
use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

const ABOUT: &str = "Compact weather forecasts from Open-Meteo";

const LONG_ABOUT: &str = "
Fetches the forecast for a city or a coordinate pair and prints a compact JSON
summary: current conditions, daily rows, period-of-day aggregates and derived
metrics (wind compass, UV risk, dew point, heat index, trend).

Windows: today, tomorrow, week, or a day count (clamped to 1..7). French
aliases (aujourd'hui, demain, semaine) are accepted. Unknown windows fall back
to today.

Without --city or --lat/--lon, the [defaults] section of the config file is used.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(name = "meteo", version, styles = STYLES, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(long, short, help = "City name to geocode (e.g. Lyon, \"Quebec City\")")]
    pub city: Option<String>,

    #[arg(long, allow_hyphen_values = true, requires = "lon", conflicts_with = "city")]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "lat", conflicts_with = "city")]
    pub lon: Option<f64>,

    #[arg(
        long,
        short,
        default_value = "today",
        help = "Forecast window; repeat to print several"
    )]
    pub window: Vec<String>,

    #[arg(long, help = "Local date treated as today (YYYY-MM-DD)")]
    pub date: Option<NaiveDate>,
}
