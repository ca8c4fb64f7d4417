//! HTML pages: city form, weather results and the info page
//!
//! Every value that originates from the user or an upstream API goes
//! through [`escape_html`] before it is written into the page.

use crate::models::{CurrentWeather, DailyForecast};
use std::fmt::Write;

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";
const TEMPERATURE_SYMBOL: &str = "°C";
const SPEED_UNIT: &str = "m/s";

/// Data for the results page
#[derive(Debug, Clone)]
pub struct WeatherView<'a> {
    /// City as requested or detected
    pub city: &'a str,
    pub current: &'a CurrentWeather,
    pub forecast: &'a DailyForecast,
}

/// Escape text for use in HTML element content and quoted attributes
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{}@2x.png", urlencoding::encode(icon))
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header>
<nav><a href="/">Search</a> <a href="/location">Use my location</a> <a href="/info">Info</a></nav>
</header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// City form, optionally with an error message above it
#[must_use]
pub fn index_page(error: Option<&str>) -> String {
    let mut body = String::from("<h1>Weather Forecast</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, r#"<p class="error">{}</p>"#, escape_html(error));
    }
    body.push_str(
        r#"<form method="post" action="/">
<label for="city">City</label>
<input type="text" id="city" name="city" placeholder="Enter a city name" autofocus>
<button type="submit">Get weather</button>
</form>
<p><a class="button" href="/location">Use my current location</a></p>
"#,
    );
    layout("Weather Forecast", &body)
}

/// Current conditions plus the daily summaries
#[must_use]
pub fn weather_page(view: &WeatherView<'_>) -> String {
    let symbol = TEMPERATURE_SYMBOL;
    let current = view.current;
    let mut body = String::new();

    let heading = match (current.name.as_str(), current.country()) {
        ("", _) => view.city.to_string(),
        (name, Some(country)) => format!("{name}, {country}"),
        (name, None) => name.to_string(),
    };
    let _ = writeln!(body, "<h1>Weather in {}</h1>", escape_html(&heading));

    body.push_str("<section class=\"current\">\n");
    if let Some(condition) = current.condition() {
        let _ = writeln!(
            body,
            r#"<img src="{}" alt="{}">"#,
            escape_html(&icon_url(&condition.icon)),
            escape_html(&condition.description)
        );
        let _ = writeln!(
            body,
            r#"<p class="description">{}</p>"#,
            escape_html(&condition.description)
        );
    }
    let _ = writeln!(
        body,
        r#"<p class="temperature">{:.1}{symbol}</p>"#,
        current.temperature()
    );
    body.push_str("<ul>\n");
    if let Some(feels_like) = current.main.feels_like {
        let _ = writeln!(body, "<li>Feels like {feels_like:.1}{symbol}</li>");
    }
    if let Some(humidity) = current.main.humidity {
        let _ = writeln!(body, "<li>Humidity {humidity}%</li>");
    }
    if let Some(pressure) = current.main.pressure {
        let _ = writeln!(body, "<li>Pressure {pressure:.0} hPa</li>");
    }
    if let Some(wind) = current.format_wind(SPEED_UNIT) {
        let _ = writeln!(body, "<li>Wind {}</li>", escape_html(&wind));
    }
    body.push_str("</ul>\n</section>\n");

    body.push_str("<section class=\"forecast\">\n<h2>5-Day Forecast</h2>\n");
    if view.forecast.is_empty() {
        body.push_str("<p>No forecast available for this city.</p>\n");
    } else {
        body.push_str("<div class=\"days\">\n");
        for day in view.forecast.iter() {
            body.push_str("<div class=\"day\">\n");
            let _ = writeln!(
                body,
                r#"<h3><time datetime="{}">{}</time></h3>"#,
                escape_html(&day.date),
                escape_html(&day.display_date())
            );
            if let (Some(icon), Some(description)) = (&day.icon, &day.description) {
                let _ = writeln!(
                    body,
                    r#"<img src="{}" alt="{}">"#,
                    escape_html(&icon_url(icon)),
                    escape_html(description)
                );
                let _ = writeln!(body, "<p>{}</p>", escape_html(description));
            }
            let _ = writeln!(
                body,
                r#"<p><span class="high">High: {:.1}{symbol}</span> <span class="low">Low: {:.1}{symbol}</span></p>"#,
                day.high, day.low
            );
            body.push_str("</div>\n");
        }
        body.push_str("</div>\n");
    }
    body.push_str("</section>\n<p><a href=\"/\">Search another city</a></p>\n");

    layout(&format!("Weather in {heading}"), &body)
}

/// Static page describing the application
#[must_use]
pub fn info_page() -> String {
    let body = r#"<h1>About this app</h1>
<p>Type a city name to see its current weather and a five-day forecast, or let
the app guess your city from your network address.</p>
<h2>How the forecast is built</h2>
<p>The provider publishes a forecast sample every three hours. For each calendar
day the app keeps the highest and lowest temperature, and shows the conditions
reported at the warmest moment of the day.</p>
<h2>Location detection</h2>
<p>Your approximate location comes from an IP geolocation service. It picks your
city when known, otherwise your region or country. Behind a VPN or corporate
proxy the guess may be far off; enter a city manually in that case.</p>
<h2>Data sources</h2>
<ul>
<li>Weather data: <a href="https://openweathermap.org/">OpenWeatherMap</a></li>
<li>IP geolocation: <a href="https://ip-api.com/">ip-api.com</a></li>
</ul>
"#;
    layout("About", body)
}
