use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use tracing::info;

use sonhario::{
    CaptureSource, CommandSynthesizer, Config, Gender, InterpretationClient, Recorder,
    SessionController, TranscriptionClient, View,
};

#[derive(Parser, Debug)]
#[command(name = "sonhario", about = "Voice dream journal: record, transcribe, interpret")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/sonhario")]
    config: String,
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn capture_source(cfg: &Config) -> Box<dyn CaptureSource> {
    #[cfg(feature = "mic")]
    {
        Box::new(sonhario::audio::MicSource::new(cfg.audio.sample_rate))
    }
    #[cfg(not(feature = "mic"))]
    {
        tracing::warn!("Built without the `mic` feature; capture uses a silent scripted source");
        Box::new(sonhario::ScriptedSource::silence(
            10,
            (cfg.audio.sample_rate / 10) as usize,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config).context("failed to load configuration")?;

    info!("Sonhário v0.1.0");

    let recorder = Recorder::new(capture_source(&cfg), cfg.audio.sample_rate, cfg.audio.channels);
    let transcriber = Box::new(TranscriptionClient::new(cfg.provider.clone()));
    let interpreter = Box::new(InterpretationClient::new(cfg.provider.clone()));
    let speech = Box::new(CommandSynthesizer::new(cfg.speech.locale.clone()));

    let mut session = SessionController::new(recorder, transcriber, interpreter, speech);

    println!("— José do Egito: Interpretador de Sonhos —");

    loop {
        while let Some(notice) = session.take_notice() {
            println!("! {notice}");
        }

        match session.view() {
            View::Onboarding => {
                println!("\n— Bem-vindo à Sessão —");
                let name = prompt("Seu nome: ")?;
                let gender = loop {
                    match prompt("Gênero [m/f]: ")?.to_lowercase().as_str() {
                        "m" => break Gender::Masculino,
                        "f" => break Gender::Feminino,
                        _ => println!("Responda m ou f."),
                    }
                };
                if !session.submit_profile(&name, gender) {
                    println!("O nome precisa de pelo menos 2 caracteres.");
                }
            }
            View::Recording => {
                if session.is_capturing() {
                    prompt("Gravando... Enter para parar. ")?;
                    session.stop_capture().await;
                } else {
                    prompt("Fale sobre seu sonho. Enter para gravar. ")?;
                    session.start_capture().await;
                }
            }
            View::Review => {
                if let Some(artifact) = session.artifact() {
                    println!(
                        "Gravação pronta: {:.1}s ({} bytes)",
                        artifact.duration_seconds(),
                        artifact.wav.len()
                    );
                }
                match prompt("[r]efazer / [a]nalisar: ")?.as_str() {
                    "r" => session.rerecord(),
                    "a" => {
                        println!("Transcrevendo...");
                        session.request_analysis().await;
                    }
                    _ => {}
                }
            }
            View::Edit => {
                println!("Transcrição: {}", session.transcript());
                let edited = prompt("Edite o texto (Enter mantém): ")?;
                if !edited.is_empty() {
                    session.edit_transcript(edited);
                }
                println!("Sondando o inconsciente...");
                session.confirm_analysis().await;
            }
            View::Interpreting => {
                // Transient: confirm_analysis resolves before control
                // returns to the loop.
            }
            View::Result => {
                println!("\n\"{}\"", session.transcript());
                println!("\n— Parecer Analítico —\n{}\n", session.interpretation());
                match prompt("[o]uvir / [n]ova sessão / [s]air: ")?.as_str() {
                    "o" => session.speak_interpretation().await,
                    "n" => session.new_session(),
                    "s" => break,
                    _ => {}
                }
            }
        }
    }

    Ok(())
}
