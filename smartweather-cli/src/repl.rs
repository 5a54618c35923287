//! Interactive prompt. Any failure inside a command is printed and the loop continues.

use inquire::{InquireError, Text};

use crate::app::App;

const PROMPT: &str = "Enter command or city ('help' for commands):";

const HELP: &str = "
Commands:
  <city name>          Fetch weather for city (eg: Tirupati)
  sample               Show local sample data
  export <city>        Export cached city's 5-day forecast to CSV (city_forecast.csv)
  alert temp<20        Add alert when current temp < 20°C
  alert temp>30        Add alert when current temp > 30°C
  alert rain           Add alert when rain is expected in forecast
  alerts               List saved alerts
  remove <n>           Remove alert number n (see list)
  help                 Show this help
  exit                 Quit";

#[derive(Debug, PartialEq)]
enum Line {
    Empty,
    Exit,
    Help,
    Sample,
    Export(String),
    AddAlert(String),
    ListAlerts,
    Remove(usize),
    Usage(&'static str),
    City(String),
}

fn parse_line(input: &str) -> Line {
    let line = input.trim();
    let lower = line.to_lowercase();

    match lower.as_str() {
        "" => return Line::Empty,
        "exit" | "quit" => return Line::Exit,
        "help" => return Line::Help,
        "sample" => return Line::Sample,
        "alerts" => return Line::ListAlerts,
        "export" => return Line::Usage("Usage: export <city>"),
        "alert" => return Line::Usage("Usage: alert temp<20  OR alert temp>30  OR alert rain"),
        "remove" => return Line::Usage("Usage: remove <alert-number>"),
        _ => {}
    }

    if let Some(city) = keyword_arg(line, &lower, "export") {
        return Line::Export(city.to_string());
    }
    if let Some(rule) = keyword_arg(line, &lower, "alert") {
        return Line::AddAlert(rule.to_string());
    }
    if let Some(n) = keyword_arg(line, &lower, "remove") {
        return match n.parse() {
            Ok(index) => Line::Remove(index),
            Err(_) => Line::Usage("Usage: remove <alert-number>"),
        };
    }
    Line::City(line.to_string())
}

/// Argument after `keyword` when `line` is `<keyword> <arg>`.
fn keyword_arg<'a>(line: &'a str, lower: &str, keyword: &str) -> Option<&'a str> {
    // An ASCII keyword prefix means byte offsets in `lower` and `line` agree.
    lower
        .strip_prefix(keyword)
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(|_| line[keyword.len()..].trim())
}

pub async fn run(mut app: App) -> anyhow::Result<()> {
    println!("Smart Weather Forecasting App (Console)");
    println!("{HELP}");

    loop {
        let input = match Text::new(PROMPT).prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match parse_line(&input) {
            Line::Empty => continue,
            Line::Exit => break,
            Line::Help => println!("{HELP}"),
            Line::Sample => println!("{}", app.sample()),
            Line::Export(city) => println!("{}", app.export(&city)),
            Line::AddAlert(rule) => println!("{}", app.add_alert(&rule)),
            Line::ListAlerts => println!("{}", app.list_alerts()),
            Line::Remove(index) => println!("{}", app.remove_alert(index)),
            Line::Usage(usage) => println!("{usage}"),
            Line::City(city) => match app.show(&city).await {
                Ok(out) => println!("{out}"),
                Err(err) => {
                    tracing::debug!(%city, error = ?err, "lookup failed");
                    println!("Failed to fetch weather: {err:#}");
                }
            },
        }
    }

    println!("Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(parse_line("  "), Line::Empty);
        assert_eq!(parse_line("EXIT"), Line::Exit);
        assert_eq!(parse_line("help"), Line::Help);
        assert_eq!(parse_line("Sample"), Line::Sample);
        assert_eq!(parse_line("alerts"), Line::ListAlerts);
    }

    #[test]
    fn commands_with_arguments_keep_user_casing() {
        assert_eq!(parse_line("export  New York "), Line::Export("New York".into()));
        assert_eq!(parse_line("ALERT Temp<20"), Line::AddAlert("Temp<20".into()));
        assert_eq!(parse_line("remove 2"), Line::Remove(2));
    }

    #[test]
    fn bad_arguments_show_usage() {
        assert_eq!(parse_line("remove two"), Line::Usage("Usage: remove <alert-number>"));
        assert_eq!(parse_line("export"), Line::Usage("Usage: export <city>"));
        assert!(matches!(parse_line("alert"), Line::Usage(_)));
    }

    #[test]
    fn anything_else_is_a_city() {
        assert_eq!(parse_line(" Tirupati "), Line::City("Tirupati".into()));
        assert_eq!(parse_line("exporter"), Line::City("exporter".into()));
        assert_eq!(parse_line("Alerts Bay"), Line::City("Alerts Bay".into()));
    }
}
