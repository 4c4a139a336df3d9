//! Command-line metadata shared by the loci binaries.

use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

pub const ABOUT: &str = "Searchable catalog of geotagged places with rating-aggregated reviews.";

/// `<crate version> (<git sha> <target triple>)`, filled in by the workspace build script.
pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	" (",
	env!("VERGEN_GIT_SHA"),
	" ",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
	")",
);

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default() | Effects::BOLD | Effects::UNDERLINE)
		.usage(AnsiColor::Green.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Magenta.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
		.valid(AnsiColor::Blue.on_default())
		.invalid(AnsiColor::Yellow.on_default() | Effects::BOLD)
}
