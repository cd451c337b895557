mod controls;
mod details;
mod legend;
mod palette;
mod panels;
mod path_finder;
