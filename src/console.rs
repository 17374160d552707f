use lazy_static::lazy_static;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::SpeechApi;
use crate::controller::{Action, Mounted, PageController};
use crate::error::ClientError;
use crate::page::{Page, TerminalPage};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Click "speak", optionally typing new text first.
    Speak(Option<String>),
    Preview,
    Text(String),
    Language(String),
    Gender(String),
    /// Voice option value; empty selects "Auto".
    Voice(String),
    Rate(Option<u32>),
    Volume(Option<f32>),
    Voices,
    Status,
    Help,
    Quit,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Not a valid {0}: '{1}'")]
    InvalidNumber(&'static str, String),
}

lazy_static! {
    static ref COMMAND_REGEX: Regex = Regex::new(
        r"(?x)
        ^\s*
        (?P<name>[A-Za-z]+)         # command word
        (?:\s+(?P<arg>.*?))?        # rest of the line
        \s*$
        "
    )
    .unwrap();
}

const HELP: &str = "\
commands:
  speak [text]        synthesize the text field (optionally replacing it)
  preview             synthesize the sample sentence
  text <text>         set the text field
  lang <code>         set the language (en, de, ...)
  gender <g>          set the gender (male, female)
  voice <value|auto>  pick a voice option
  rate <n|default>    speech rate in words per minute
  volume <f|default>  volume between 0.0 and 1.0
  voices              list voice options
  status              show page state
  quit                leave at once, stopping requests and audio
end of input waits for a pending request to finish before leaving";

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let Some(cap) = COMMAND_REGEX.captures(line) else {
        return Err(CommandError::Unknown(line.trim().to_string()));
    };

    let name = cap["name"].to_ascii_lowercase();
    let arg = cap
        .name("arg")
        .map(|m| m.as_str().to_string())
        .filter(|a| !a.is_empty());

    let required = |what: &'static str| arg.clone().ok_or(CommandError::MissingArgument(what));

    match name.as_str() {
        "speak" | "say" => Ok(Command::Speak(arg)),
        "preview" => Ok(Command::Preview),
        "text" => Ok(Command::Text(required("text")?)),
        "lang" | "language" => Ok(Command::Language(required("lang")?)),
        "gender" => Ok(Command::Gender(required("gender")?)),
        "voice" => {
            let value = arg.unwrap_or_default();
            if value.eq_ignore_ascii_case("auto") {
                Ok(Command::Voice(String::new()))
            } else {
                Ok(Command::Voice(value))
            }
        }
        "rate" => parse_optional(&required("rate")?, "rate").map(Command::Rate),
        "volume" => {
            let volume: Option<f32> = parse_optional(&required("volume")?, "volume")?;
            match volume {
                Some(v) if !(0.0..=1.0).contains(&v) => {
                    Err(CommandError::InvalidNumber("volume", v.to_string()))
                }
                _ => Ok(Command::Volume(volume)),
            }
        }
        "voices" => Ok(Command::Voices),
        "status" => Ok(Command::Status),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(CommandError::Unknown(name)),
    }
}

fn parse_optional<T: std::str::FromStr>(
    raw: &str,
    what: &'static str,
) -> Result<Option<T>, CommandError> {
    if raw.eq_ignore_ascii_case("default") {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| CommandError::InvalidNumber(what, raw.to_string()))
}

/// Read commands from stdin until `quit` or end of input. At end of input
/// the request started by the last click is allowed to settle.
pub async fn run<A: SpeechApi>(
    controller: &PageController<A, TerminalPage>,
    mounted: &Mounted,
) -> Result<(), ClientError> {
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match parse(&line) {
            Ok(Command::Quit) => return Ok(()),
            Ok(command) => execute(command, controller, mounted),
            Err(e) => println!("{}", e),
        }
    }

    mounted.flush().await;
    if !controller.page().controls_enabled() {
        tracing::info!("End of input, waiting for the pending request");
        controller.wait_idle().await;
    }

    Ok(())
}

fn execute<A: SpeechApi>(
    command: Command,
    controller: &PageController<A, TerminalPage>,
    mounted: &Mounted,
) {
    let page = controller.page();

    match command {
        Command::Speak(text) => {
            if let Some(text) = text {
                page.update_form(|f| f.text = text);
            }
            mounted.click(Action::Speak);
        }
        Command::Preview => mounted.click(Action::Preview),
        Command::Text(text) => page.update_form(|f| f.text = text),
        Command::Language(language) => page.update_form(|f| f.language = language),
        Command::Gender(gender) => page.update_form(|f| f.gender = gender),
        Command::Voice(value) => {
            if !page.select_voice(&value) {
                println!("No voice option '{}', see 'voices'", value);
            }
        }
        Command::Rate(rate) => page.update_form(|f| f.rate = rate),
        Command::Volume(volume) => page.update_form(|f| f.volume = volume),
        Command::Voices => {
            let selected = page.form().voice;
            let options = page.voice_options();
            if options.is_empty() {
                println!("No voices loaded");
            }
            for option in options {
                let marker = if option.value == selected { '*' } else { ' ' };
                let value = if option.value.is_empty() { "auto" } else { option.value.as_str() };
                println!("{} {:<32} {}", marker, value, option.label);
            }
        }
        Command::Status => {
            let form = page.form();
            println!("state:    {:?}", controller.state());
            println!("status:   {}", page.status());
            println!("controls: {}", if page.controls_enabled() { "enabled" } else { "disabled" });
            println!("text:     {}", form.text);
            println!("language: {}  gender: {}", form.language, form.gender);
            println!(
                "voice:    {}",
                if form.voice.is_empty() { "auto" } else { form.voice.as_str() }
            );
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}
