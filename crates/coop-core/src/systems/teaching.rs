//! Teaching and Diffusion
//!
//! A qualified teacher implants a cooperative memory in an untaught human,
//! raises their trust, and occasionally awakens them.

use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;

use crate::components::{Agent, AgentId, Scar, ScarSource};
use crate::config::TeachingConfig;

/// Record of one successful teaching event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lesson {
    pub teacher: AgentId,
    pub student: AgentId,
    /// The student was awakened by this lesson
    pub awakened: bool,
}

/// Apply a lesson from `teacher` to `student`. No-op unless the teacher can teach.
///
/// The teacher's id is copied into the student, so removing the teacher later
/// leaves nothing dangling.
pub fn receive_teaching(
    student: &mut Agent,
    teacher: &Agent,
    config: &TeachingConfig,
    rng: &mut SmallRng,
) -> Option<Lesson> {
    if !teacher.can_teach(config) {
        return None;
    }

    student
        .scars
        .push(Scar::cooperative(config.taught_scar_weight, ScarSource::Taught));
    student.mark_taught(teacher.id);
    student.adjust_trust(config.trust_boost);

    let awakened = rng.gen::<f64>() < config.awakening_chance;
    if awakened {
        student.flags.awakened = true;
    }

    tracing::debug!(
        teacher = %teacher.id,
        student = %student.id,
        awakened,
        "teaching"
    );

    Some(Lesson {
        teacher: teacher.id,
        student: student.id,
        awakened,
    })
}

/// Teach only if the student is a human nobody has taught yet.
pub fn maybe_teach(
    teacher: &Agent,
    student: &mut Agent,
    config: &TeachingConfig,
    rng: &mut SmallRng,
) -> Option<Lesson> {
    if student.is_ai() || student.was_taught() {
        return None;
    }
    receive_teaching(student, teacher, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Action, Flags, Outcome, Variant};
    use rand::SeedableRng;

    #[test]
    fn test_bridge_teaches_human() {
        let config = TeachingConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let bridge = Agent::new(AgentId(1), Variant::AiBridge, 0);
        let mut student = Agent::human(AgentId(2), 0).with_trust(0.3);

        let lesson = maybe_teach(&bridge, &mut student, &config, &mut rng).unwrap();

        assert_eq!(lesson.teacher, AgentId(1));
        assert_eq!(student.taught_by(), Some(AgentId(1)));
        assert!((student.trust() - 0.4).abs() < 1e-12);

        let scar = student.scars.newest().unwrap();
        assert_eq!(scar.source, ScarSource::Taught);
        assert_eq!(scar.my_response, Action::Cooperate);
        assert_eq!(scar.outcome, Outcome::Thrived);
        assert_eq!(scar.weight, 0.7);
    }

    #[test]
    fn test_taught_once() {
        let config = TeachingConfig::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let first = Agent::new(AgentId(1), Variant::AiBridge, 0);
        let second = Agent::new(AgentId(2), Variant::AiBridge, 0);
        let mut student = Agent::human(AgentId(3), 0);

        assert!(maybe_teach(&first, &mut student, &config, &mut rng).is_some());
        assert!(maybe_teach(&second, &mut student, &config, &mut rng).is_none());
        assert_eq!(student.taught_by(), Some(AgentId(1)));
        assert_eq!(student.scars.len(), 1);
    }

    #[test]
    fn test_direct_teaching_keeps_first_teacher() {
        let config = TeachingConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let first = Agent::new(AgentId(1), Variant::AiBridge, 0);
        let second = Agent::new(AgentId(2), Variant::AiBridge, 0);
        let mut student = Agent::human(AgentId(3), 0);

        receive_teaching(&mut student, &first, &config, &mut rng);
        receive_teaching(&mut student, &second, &config, &mut rng);
        assert_eq!(student.taught_by(), Some(AgentId(1)));
    }

    #[test]
    fn test_unqualified_teacher_is_noop() {
        let config = TeachingConfig::default();
        let mut rng = SmallRng::seed_from_u64(4);
        let coherent = Agent::new(AgentId(1), Variant::AiCoherent, 0);
        let mut student = Agent::human(AgentId(2), 0).with_trust(0.3);

        assert!(maybe_teach(&coherent, &mut student, &config, &mut rng).is_none());
        assert_eq!(student.taught_by(), None);
        assert_eq!(student.trust(), 0.3);
        assert!(student.scars.is_empty());
    }

    #[test]
    fn test_ai_students_are_skipped() {
        let config = TeachingConfig::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let awakened = Agent::human(AgentId(1), 0).with_flags(Flags {
            awakened: true,
            ..Default::default()
        });
        let mut ai = Agent::new(AgentId(2), Variant::AiNaive, 0);

        assert!(maybe_teach(&awakened, &mut ai, &config, &mut rng).is_none());
    }

    #[test]
    fn test_certain_awakening() {
        let config = TeachingConfig {
            awakening_chance: 1.0,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(6);
        let bridge = Agent::new(AgentId(1), Variant::AiBridge, 0);
        let mut student = Agent::human(AgentId(2), 0);

        let lesson = maybe_teach(&bridge, &mut student, &config, &mut rng).unwrap();
        assert!(lesson.awakened);
        assert!(student.flags.awakened);
        assert!(student.can_teach(&config));
    }
}
