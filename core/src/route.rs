//! Course page route matching.
//!
//! A course page is `/user/courses/<courseId>` optionally followed by
//! `/chapters/<chapterId>`. Ids are any non-empty segment; nothing else may
//! follow, and a trailing slash does not match.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRoute {
    pub course_id: String,
    pub chapter_id: Option<String>,
}

impl CourseRoute {
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_prefix("/user/courses/")?;
        let mut segments = rest.split('/');
        let course_id = non_empty(segments.next())?;

        let chapter_id = match segments.next() {
            None => None,
            Some("chapters") => Some(non_empty(segments.next())?),
            Some(_) => return None,
        };
        if segments.next().is_some() {
            return None;
        }

        Some(Self {
            course_id: course_id.to_string(),
            chapter_id: chapter_id.map(str::to_string),
        })
    }
}

pub fn is_course_page(path: &str) -> bool {
    CourseRoute::parse(path).is_some()
}

fn non_empty(segment: Option<&str>) -> Option<&str> {
    segment.filter(|s| !s.is_empty())
}
