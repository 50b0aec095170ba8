pub mod lesson_view;
pub mod menu;
pub mod practice_area;
pub mod progress_bar;
pub mod progress_dots;
