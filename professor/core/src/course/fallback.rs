//! Deterministic content used when generation is unavailable or fails

use super::model::{
    Course, CourseModule, Difficulty, Exercise, ExerciseKind, LessonBody, LessonContent, LessonExample, LessonRequest,
    Resource,
};

/// Answer shown when a question could not be answered
pub const FALLBACK_ANSWER: &str = "I'm sorry, I couldn't process that question right now.";

/// Four-module template course for `topic`
#[must_use]
pub fn fallback_course(topic: &str) -> Course {
    Course {
        id: Course::new_id(),
        title: format!("Complete {topic} Mastery"),
        description: format!(
            "A comprehensive course covering all essential aspects of {}, designed for practical skill application.",
            topic.to_lowercase()
        ),
        estimated_duration: "11.5 hours".to_string(),
        difficulty: Difficulty::Intermediate,
        modules: vec![
            CourseModule::new("module-1", format!("{topic} Fundamentals"), "2 hours").with_topics([
                "Core Concepts",
                "Basic Principles",
                "Getting Started",
            ]),
            CourseModule::new("module-2", format!("Practical {topic}"), "3 hours").with_topics([
                "Hands-on Practice",
                "Real-world Examples",
                "Common Patterns",
            ]),
            CourseModule::new("module-3", format!("Advanced {topic}"), "2.5 hours").with_topics([
                "Advanced Techniques",
                "Best Practices",
                "Optimization",
            ]),
            CourseModule::new("module-4", "Final Project", "4 hours").with_topics([
                "Project Planning",
                "Implementation",
                "Review & Feedback",
            ]),
        ],
        created_at: None,
    }
}

/// Template lesson for `request`
#[must_use]
pub fn fallback_lesson(request: &LessonRequest) -> LessonContent {
    let LessonRequest {
        lesson_title,
        topic,
        module_title,
        ..
    } = request;

    LessonContent {
        introduction: format!(
            "Welcome to {lesson_title}! This lesson will cover the key concepts and practical applications."
        ),
        learning_objectives: vec![
            format!("Understand the fundamentals of {topic}"),
            "Apply concepts to real-world scenarios".to_string(),
            "Complete hands-on exercises".to_string(),
        ],
        content: LessonBody {
            explanation: format!(
                "{topic} is an important concept that forms the foundation of {module_title}. In this lesson, \
                 we'll explore its key aspects and learn how to implement it effectively."
            ),
            key_points: vec![
                format!("Core principles of {topic}"),
                "Best practices and common patterns".to_string(),
                "Real-world applications and use cases".to_string(),
            ],
            examples: vec![LessonExample {
                title: "Basic Example".to_string(),
                description: format!("Here's a simple example of {topic} in action."),
                code: Some("// Example code will be generated based on the topic".to_string()),
                language: Some("javascript".to_string()),
            }],
        },
        exercises: vec![Exercise {
            question: format!("Which of the following best describes {topic}?"),
            kind: ExerciseKind::MultipleChoice,
            options: ["Option A", "Option B", "Option C", "Option D"]
                .into_iter()
                .map(String::from)
                .collect(),
            correct_answer: Some("Option A".to_string()),
            explanation: Some("This is the correct answer because...".to_string()),
        }],
        resources: vec![Resource {
            title: format!("Learn more about {topic}"),
            kind: "documentation".to_string(),
            url: "#".to_string(),
            description: "Additional resources for deeper learning".to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fallback_course_template() {
        let course = fallback_course("Guitar");
        assert_eq!(course.title, "Complete Guitar Mastery");
        assert_eq!(course.estimated_duration, "11.5 hours");
        assert_eq!(course.difficulty, Difficulty::Intermediate);

        let titles: Vec<_> = course.modules.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Guitar Fundamentals", "Practical Guitar", "Advanced Guitar", "Final Project"]
        );
        let durations: Vec<_> = course.modules.iter().map(|m| m.duration.as_str()).collect();
        assert_eq!(durations, vec!["2 hours", "3 hours", "2.5 hours", "4 hours"]);
        assert!(course.description.contains("aspects of guitar"));
    }

    #[test]
    fn test_fallback_course_ids_are_fresh() {
        assert_ne!(fallback_course("A").id, fallback_course("A").id);
    }

    #[test]
    fn test_fallback_lesson_mentions_request() {
        let request = LessonRequest {
            lesson_title: "Intro to Chords".into(),
            topic: "Chords".into(),
            module_title: "Guitar Fundamentals".into(),
            difficulty: Difficulty::Beginner,
        };
        let lesson = fallback_lesson(&request);
        assert!(lesson.introduction.starts_with("Welcome to Intro to Chords!"));
        assert_eq!(lesson.learning_objectives[0], "Understand the fundamentals of Chords");
        assert!(lesson.content.explanation.contains("foundation of Guitar Fundamentals"));
        assert_eq!(lesson.exercises[0].options.len(), 4);
        assert_eq!(lesson.resources[0].kind, "documentation");
    }
}
