mod strings;
mod styles;
