/// Speech-to-text backend built on whisper.cpp.
#[cfg(feature = "whisper")]
pub mod whisper;

/// Text-to-speech backend talking to an OpenAI-compatible HTTP server.
#[cfg(feature = "http-tts")]
pub mod http;
