//! Minimal end-to-end demonstration of [`streamlib::metadata::MetadataCollector`]: probes a URL
//! given on the command line and prints the resulting stream list.

use std::env;

use streamlib::metadata::{
	CollectorEvent,
	MetadataCollector,
};

fn main() {
	let Some(url) = env::args().nth(1) else {
		eprintln!("usage: probe <url>");
		std::process::exit(1);
	};

	let mut collector = MetadataCollector::new();
	let rx = collector.run_async(&url);

	match rx.recv() {
		Ok(CollectorEvent::Collected(streams)) => {
			for stream in streams {
				println!(
					"{}\t{}\t{}\t{}",
					stream.id,
					stream.title(),
					stream.extractor,
					if stream.is_available() { "available" } else { "unavailable" }
				);
			}
		},
		Ok(CollectorEvent::Error(message)) => {
			eprintln!("error: {message}");
			std::process::exit(1);
		},
		Err(_) => {
			eprintln!("error: collector worker thread vanished");
			std::process::exit(1);
		},
	}
}
