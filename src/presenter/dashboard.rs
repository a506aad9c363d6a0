//! Dashboard view model and static HTML rendering

use super::cache::Artifacts;
use super::guidance::{guidance, Guidance};
use super::metrics::{DerivedMetrics, Direction};
use crate::currency::CurrencyPair;
use crate::data::write_atomically;
use crate::error::{ForecastError, Result};
use crate::forecast::FittedForecast;
use crate::types::{ForecastPoint, Observation};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::path::Path;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.32.0.min.js";
const HISTORY_COLOR: &str = "#1f77b4";
const FORECAST_COLOR: &str = "#ff7f0e";
const BAND_FILL: &str = "rgba(255,127,14,0.2)";
const BAND_EDGE: &str = "rgba(255,127,14,0)";

/// Display format for dates on the dashboard, e.g. `Jan 01, 2025`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Signed percentage with two decimals, e.g. `+5.00%`
pub fn format_pct(pct: f64) -> String {
    format!("{:+.2}%", pct)
}

/// Tone of a card's delta line. Rising rates are bad news for the quote currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Neutral,
    Good,
    Bad,
}

impl Tone {
    fn for_rate_change(change: f64) -> Self {
        if change > 0.0 {
            Tone::Bad
        } else if change < 0.0 {
            Tone::Good
        } else {
            Tone::Neutral
        }
    }

    fn css_class(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Good => "good",
            Tone::Bad => "bad",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub title: String,
    pub value: String,
    pub delta: String,
    pub tone: Tone,
}

/// One formatted row of the forecast table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: String,
    pub predicted: String,
    pub lower: String,
    pub upper: String,
}

/// Model and data provenance shown in the about panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AboutPanel {
    pub model_name: String,
    pub changepoints: usize,
    /// Seasonal components the model was fitted with
    pub seasonalities: Vec<String>,
    pub history_days: usize,
    pub history_start: NaiveDate,
    pub history_end: NaiveDate,
    pub trained_at: DateTime<Utc>,
    pub interval_width: f64,
}

/// Everything the dashboard shows, derived from one set of artifacts
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub pair: CurrencyPair,
    pub metrics: DerivedMetrics,
    pub guidance: Guidance,
    pub about: AboutPanel,
    historical: Vec<Observation>,
    future: Vec<ForecastPoint>,
}

impl Dashboard {
    /// Derive metrics and guidance. Fails if the artifacts do not support a 30-day view.
    pub fn build(artifacts: &Artifacts, pair: CurrencyPair) -> Result<Self> {
        let metrics = DerivedMetrics::derive(&artifacts.history, &artifacts.forecast)?;
        let guidance = guidance(pair, metrics.direction, metrics.change_pct_30d);
        let model = &artifacts.model;

        Ok(Self {
            pair,
            guidance,
            about: AboutPanel {
                model_name: model.name().to_string(),
                changepoints: model.changepoint_count(),
                seasonalities: model
                    .seasonal_fits()
                    .iter()
                    .map(|s| s.seasonality.name.clone())
                    .collect(),
                history_days: model.history_len,
                history_start: model.history_start,
                history_end: model.history_end,
                trained_at: model.fitted_at,
                interval_width: model.config.interval_width,
            },
            historical: artifacts.history.observations().to_vec(),
            future: artifacts.forecast.after(metrics.latest_date).to_vec(),
            metrics,
        })
    }

    /// Forecast rows dated after the latest observation
    pub fn future(&self) -> &[ForecastPoint] {
        &self.future
    }

    pub fn cards(&self) -> Vec<MetricCard> {
        let m = &self.metrics;
        let quote = self.pair.quote;
        let trend = match m.direction {
            Direction::Weakening => Tone::Bad,
            Direction::Strengthening => Tone::Good,
        };

        vec![
            MetricCard {
                title: "Current Rate".to_string(),
                value: quote.format_amount(m.latest_rate),
                delta: format!("As of {}", format_date(m.latest_date)),
                tone: Tone::Neutral,
            },
            MetricCard {
                title: "7-Day Forecast".to_string(),
                value: quote.format_amount(m.forecast_7d.yhat),
                delta: format_pct(m.change_pct_7d),
                tone: Tone::for_rate_change(m.change_7d),
            },
            MetricCard {
                title: "30-Day Forecast".to_string(),
                value: quote.format_amount(m.forecast_30d.yhat),
                delta: format_pct(m.change_pct_30d),
                tone: Tone::for_rate_change(m.change_30d),
            },
            MetricCard {
                title: "30-Day Trend".to_string(),
                value: m.direction.label().to_string(),
                delta: quote.format_amount(m.change_30d.abs()),
                tone: trend,
            },
        ]
    }

    pub fn forecast_rows(&self) -> Vec<ForecastRow> {
        let quote = self.pair.quote;
        self.future
            .iter()
            .map(|p| ForecastRow {
                date: format_date(p.date),
                predicted: quote.format_amount(p.yhat),
                lower: quote.format_amount(p.yhat_lower),
                upper: quote.format_amount(p.yhat_upper),
            })
            .collect()
    }

    pub fn title(&self) -> String {
        format!(
            "{} Exchange Rate: Historical & {}-Day Forecast",
            self.pair,
            self.future.len()
        )
    }

    /// Plotly figure: history, dashed forecast, and the band between the bounds
    pub fn chart_figure(&self) -> Value {
        let iso = |d: &NaiveDate| d.format(crate::data::DATE_FORMAT).to_string();
        let future_x: Vec<String> = self.future.iter().map(|p| iso(&p.date)).collect();

        json!({
            "data": [
                {
                    "type": "scatter",
                    "mode": "lines",
                    "name": "Historical Rate",
                    "x": self.historical.iter().map(|o| iso(&o.date)).collect::<Vec<_>>(),
                    "y": self.historical.iter().map(|o| o.rate).collect::<Vec<_>>(),
                    "line": { "color": HISTORY_COLOR, "width": 2 }
                },
                {
                    "type": "scatter",
                    "mode": "lines",
                    "name": "Predicted Rate",
                    "x": future_x,
                    "y": self.future.iter().map(|p| p.yhat).collect::<Vec<_>>(),
                    "line": { "color": FORECAST_COLOR, "width": 2, "dash": "dash" }
                },
                {
                    "type": "scatter",
                    "mode": "lines",
                    "x": future_x,
                    "y": self.future.iter().map(|p| p.yhat_upper).collect::<Vec<_>>(),
                    "line": { "color": BAND_EDGE },
                    "showlegend": false,
                    "hoverinfo": "skip"
                },
                {
                    "type": "scatter",
                    "mode": "lines",
                    "name": "Confidence Range",
                    "x": future_x,
                    "y": self.future.iter().map(|p| p.yhat_lower).collect::<Vec<_>>(),
                    "fill": "tonexty",
                    "fillcolor": BAND_FILL,
                    "line": { "color": BAND_EDGE },
                    "hoverinfo": "skip"
                }
            ],
            "layout": {
                "title": { "text": self.title() },
                "xaxis": { "title": { "text": "Date" } },
                "yaxis": {
                    "title": {
                        "text": format!(
                            "Exchange Rate ({} per {})",
                            self.pair.quote.code(),
                            self.pair.base.code()
                        )
                    }
                },
                "hovermode": "x unified",
                "height": 500,
                "legend": {
                    "orientation": "h",
                    "yanchor": "bottom",
                    "y": 1.02,
                    "xanchor": "right",
                    "x": 1
                }
            }
        })
    }

    /// Self-contained HTML page; Plotly is loaded from its CDN
    pub fn render_html(&self) -> Result<String> {
        let figure = serde_json::to_string(&self.chart_figure())?.replace("</", "<\\/");
        let mut html = String::with_capacity(16 * 1024 + figure.len());
        self.write_html(&mut html, &figure)
            .map_err(|e| ForecastError::DataError(format!("Failed to render dashboard: {}", e)))?;
        Ok(html)
    }

    /// Render and write the page atomically
    pub fn save_html(&self, path: &Path) -> Result<()> {
        let html = self.render_html()?;
        write_atomically(path, html.as_bytes())?;
        log::info!("Dashboard written to {}", path.display());
        Ok(())
    }

    fn write_html(&self, out: &mut String, figure: &str) -> std::fmt::Result {
        let quote = self.pair.quote;
        let base = self.pair.base;

        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">")?;
        writeln!(
            out,
            "<title>{} Exchange Rate Predictor</title>",
            escape(quote.name())
        )?;
        writeln!(out, "<script src=\"{}\"></script>", PLOTLY_CDN)?;
        writeln!(out, "<style>{}</style>\n</head>\n<body>", STYLE)?;

        writeln!(
            out,
            "<h1>{} Exchange Rate Predictor</h1>\n<h3>{} Forecasting System</h3>\n<hr>",
            escape(quote.name()),
            escape(&self.pair.to_string())
        )?;

        writeln!(out, "<div class=\"cards\">")?;
        for card in self.cards() {
            writeln!(
                out,
                "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div><div class=\"delta {}\">{}</div></div>",
                escape(&card.title),
                escape(&card.value),
                card.tone.css_class(),
                escape(&card.delta)
            )?;
        }
        writeln!(out, "</div>\n<hr>")?;

        let g = &self.guidance;
        let panel = match g.direction {
            Direction::Weakening => "warning",
            Direction::Strengthening => "success",
        };
        writeln!(out, "<h2>What This Means For You</h2>")?;
        writeln!(
            out,
            "<div class=\"guidance {}\"><p><strong>{}</strong></p>",
            panel,
            escape(&g.headline)
        )?;
        write_list(out, "For Individuals:", &g.individuals)?;
        write_list(out, "For Businesses:", &g.businesses)?;
        writeln!(out, "</div>\n<hr>")?;

        writeln!(out, "<h2>Historical Rates &amp; Forecast</h2>")?;
        writeln!(out, "<div id=\"chart\"></div>")?;
        writeln!(
            out,
            "<script>const figure = {};\nPlotly.newPlot(\"chart\", figure.data, figure.layout, {{responsive: true}});</script>\n<hr>",
            figure
        )?;

        writeln!(
            out,
            "<h2>Detailed {}-Day Forecast</h2>",
            self.future.len()
        )?;
        writeln!(
            out,
            "<table>\n<thead><tr><th>Date</th><th>Predicted Rate</th><th>Lower Bound</th><th>Upper Bound</th></tr></thead>\n<tbody>"
        )?;
        for row in self.forecast_rows() {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&row.date),
                escape(&row.predicted),
                escape(&row.lower),
                escape(&row.upper)
            )?;
        }
        writeln!(out, "</tbody>\n</table>\n<hr>")?;

        let a = &self.about;
        writeln!(out, "<h2>About This Prediction System</h2>\n<div class=\"about\">")?;
        write_list(
            out,
            "How It Works:",
            &[
                match a.seasonalities.as_slice() {
                    [] => format!(
                        "{} model: piecewise-linear trend with {} changepoints",
                        a.model_name, a.changepoints
                    ),
                    names => format!(
                        "{} model: piecewise-linear trend with {} changepoints plus {} seasonality",
                        a.model_name,
                        a.changepoints,
                        names.join(" and ")
                    ),
                },
                format!(
                    "Trained on {} days of {} data ({} to {})",
                    a.history_days,
                    self.pair,
                    format_date(a.history_start),
                    format_date(a.history_end)
                ),
                format!(
                    "{}-day forecast with {:.0}% confidence intervals",
                    self.future.len(),
                    a.interval_width * 100.0
                ),
            ],
        )?;
        write_list(
            out,
            "Data Source:",
            &[
                "Yahoo Finance daily closing rates".to_string(),
                format!(
                    "Model last trained: {}",
                    a.trained_at.format("%b %d, %Y %H:%M UTC")
                ),
                "Predictions are meant for short-term planning (7 to 30 days)".to_string(),
            ],
        )?;
        write_list(
            out,
            "Use Cases:",
            &[
                "Personal finance planning (travel, remittances, savings)".to_string(),
                "Import and export business decisions".to_string(),
                format!(
                    "Budget forecasting for {}-denominated expenses",
                    base.name().to_lowercase()
                ),
            ],
        )?;
        write_list(
            out,
            "Accuracy Note:",
            &[
                "Exchange rates react to policy, commodity prices and global markets".to_string(),
                "The model captures historical patterns but cannot foresee sudden policy changes"
                    .to_string(),
                "Use it as a guide, not as absolute truth".to_string(),
            ],
        )?;
        writeln!(out, "</div>\n<hr>")?;
        writeln!(
            out,
            "<footer><p>Data from Yahoo Finance</p><p>This is a forecasting tool. Consult a financial advisor for major decisions.</p></footer>"
        )?;
        writeln!(out, "</body>\n</html>")
    }
}

fn write_list(out: &mut String, heading: &str, items: &[String]) -> std::fmt::Result {
    writeln!(out, "<p><strong>{}</strong></p>\n<ul>", escape(heading))?;
    for item in items {
        writeln!(out, "<li>{}</li>", escape(item))?;
    }
    writeln!(out, "</ul>")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = "body{font-family:sans-serif;max-width:1100px;margin:0 auto;padding:1rem;color:#262730}\
.cards{display:flex;gap:1rem}.card{flex:1;padding:.75rem;border:1px solid #e6e6e6;border-radius:.5rem}\
.label{font-size:.9rem;color:#555}.value{font-size:1.8rem}.delta{font-size:.9rem}\
.good{color:#09ab3b}.bad{color:#ff2b2b}.neutral{color:#555}\
.guidance{padding:.5rem 1rem;border-radius:.5rem}.warning{background:#fffce7}.success{background:#e8f9ee}\
table{border-collapse:collapse;width:100%}th,td{padding:.3rem .6rem;border-bottom:1px solid #eee;text-align:left}\
.about{columns:2}footer{text-align:center;color:#555}";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ForecastTable, HistoricalSeries};
    use crate::forecast::{AdditiveModel, Forecaster};

    fn artifacts() -> Artifacts {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let history = HistoricalSeries::from_observations(
            start
                .iter_days()
                .take(120)
                .enumerate()
                .map(|(i, d)| Observation::new(d, 1450.0 + 0.5 * i as f64))
                .collect(),
        );
        let output = Forecaster::with_model(AdditiveModel::default())
            .train(&history)
            .unwrap();
        Artifacts {
            history,
            forecast: output.forecast,
            model: output.fitted,
        }
    }

    #[test]
    fn test_formatting_helpers() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(format_date(date), "Jan 01, 2025");
        assert_eq!(format_pct(5.0), "+5.00%");
        assert_eq!(format_pct(-0.123), "-0.12%");
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_cards_and_rows() {
        let dashboard = Dashboard::build(&artifacts(), CurrencyPair::USD_NGN).unwrap();
        let cards = dashboard.cards();

        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].title, "Current Rate");
        assert_eq!(cards[0].value, "₦1509.50");
        assert_eq!(cards[0].delta, "As of Sep 28, 2023");
        assert!(cards[1].delta.starts_with('+'));
        assert_eq!(cards[3].value, "Weakening");
        assert_eq!(cards[3].tone, Tone::Bad);

        let rows = dashboard.forecast_rows();
        assert_eq!(rows.len(), 30);
        assert_eq!(rows[0].date, "Sep 29, 2023");
        assert!(rows[0].predicted.starts_with('₦'));
    }

    #[test]
    fn test_chart_figure_traces() {
        let dashboard = Dashboard::build(&artifacts(), CurrencyPair::USD_NGN).unwrap();
        let figure = dashboard.chart_figure();
        let data = figure["data"].as_array().unwrap();

        assert_eq!(data.len(), 4);
        assert_eq!(data[0]["x"].as_array().unwrap().len(), 120);
        assert_eq!(data[0]["line"]["color"], HISTORY_COLOR);
        assert_eq!(data[1]["line"]["dash"], "dash");
        assert_eq!(data[1]["x"].as_array().unwrap().len(), 30);
        assert_eq!(data[3]["fill"], "tonexty");
        assert_eq!(data[3]["fillcolor"], BAND_FILL);
        assert_eq!(
            figure["layout"]["title"]["text"],
            "USD/NGN Exchange Rate: Historical & 30-Day Forecast"
        );
    }

    #[test]
    fn test_render_html() {
        let artifacts = artifacts();
        let dashboard = Dashboard::build(&artifacts, CurrencyPair::USD_NGN).unwrap();
        let html = dashboard.render_html().unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("Naira Expected to Weaken by"));
        assert!(html.contains("Model last trained: "));
        // 120 days of history is too short for the yearly component
        assert!(html.contains("changepoints plus weekly seasonality"));
        assert!(html.contains(&format_date(artifacts.model.fitted_at.date_naive())));
        assert!(html.contains("<td>Sep 29, 2023</td>"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_build_fails_with_short_forecast() {
        let mut artifacts = artifacts();
        let points = artifacts.forecast.points();
        artifacts.forecast = ForecastTable::from_points(points[..points.len() - 1].to_vec());

        assert!(matches!(
            Dashboard::build(&artifacts, CurrencyPair::USD_NGN),
            Err(ForecastError::InsufficientForecast { available: 29, .. })
        ));
    }
}
