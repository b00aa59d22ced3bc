mod font_references;
mod line_edits;
mod rationalize;
mod round_trip;
