pub mod grade;
pub mod homework;
pub mod loaders;
pub mod stage;

pub use grade::{Evaluation, GradeRecord, GradingPolicy};
pub use homework::HomeworkImage;
pub use loaders::{load_all_images, load_image};
pub use stage::Stage;
