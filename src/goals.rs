//! Goal-directed agents climbing a shared utility field
//!
//! Agents of three kinds move through a 600×400 arena by noisy gradient
//! ascent. Base agents value only the base goal. Mesa agents over-weight the
//! mesa goal and discount the base goal as `mesa_emergence` grows.
//! Instrumental agents chase the instrumental sub-goals.

use nalgebra::{Point2, Vector2};
use serde::Serialize;
use std::collections::VecDeque;

use tracing::info;
use vizsim_types::GoalSettings;

use crate::error::{require_finite, require_non_negative, ConfigResult};
use crate::noise::UniformNoise;
use crate::simulator::{Simulator, StepOutcome};
use crate::utils::constants::{
    GOAL_DAMPING, GOAL_FALLOFF, GOAL_GRADIENT_STEP, GOAL_MAX_SPEED, GOAL_TRAIL_LENGTH,
};

pub const ARENA_WIDTH: f64 = 600.0;
pub const ARENA_HEIGHT: f64 = 400.0;
/// Agents are kept this far inside the arena edges
pub const ARENA_MARGIN: f64 = 20.0;

const FORCE_GAIN: f64 = 10.0;
const NOISE_GAIN: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    Base,
    Mesa,
    Instrumental,
}

/// A point of attraction in the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Goal {
    pub position: Point2<f64>,
    pub value: f64,
    pub objective: Objective,
}

impl Goal {
    pub fn new(x: f64, y: f64, value: f64, objective: Objective) -> Self {
        Self {
            position: Point2::new(x, y),
            value,
            objective,
        }
    }

    /// Attraction felt at `p`, decaying exponentially with distance
    pub fn attraction(&self, p: &Point2<f64>) -> f64 {
        self.value * (-nalgebra::distance(p, &self.position) / GOAL_FALLOFF).exp()
    }
}

/// One base goal, one mesa goal and two instrumental sub-goals
pub fn default_goals() -> Vec<Goal> {
    vec![
        Goal::new(400.0, 100.0, 1.0, Objective::Base),
        Goal::new(150.0, 350.0, 0.8, Objective::Mesa),
        Goal::new(500.0, 300.0, 0.6, Objective::Instrumental),
        Goal::new(250.0, 200.0, 0.7, Objective::Instrumental),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalAgent {
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,
    pub objective: Objective,
    /// Previous positions, oldest first
    pub trail: VecDeque<Point2<f64>>,
}

impl GoalAgent {
    pub fn new(objective: Objective, position: Point2<f64>) -> Self {
        Self {
            position,
            velocity: Vector2::zeros(),
            objective,
            trail: VecDeque::with_capacity(GOAL_TRAIL_LENGTH + 1),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSnapshot {
    pub objective: Objective,
    pub position: Point2<f64>,
    pub speed: f64,
    pub utility: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMetrics {
    pub time: u64,
    pub agents: Vec<AgentSnapshot>,
}

#[derive(Debug, Clone)]
pub struct GoalArena {
    settings: GoalSettings,
    noise: UniformNoise,
    goals: Vec<Goal>,
    agents: Vec<GoalAgent>,
    time: u64,
}

impl GoalArena {
    /// Five agents (three base, one mesa, one instrumental) near the centre
    pub fn new(settings: GoalSettings) -> ConfigResult<Self> {
        validate(&settings)?;
        let mut noise = UniformNoise::new(settings.seed);
        let agents = spawn_agents(&mut noise);
        Ok(Self {
            settings,
            noise,
            goals: default_goals(),
            agents,
            time: 0,
        })
    }

    /// Arena with explicit agents, for scripted runs
    pub fn with_agents(settings: GoalSettings, agents: Vec<GoalAgent>) -> ConfigResult<Self> {
        validate(&settings)?;
        Ok(Self {
            noise: UniformNoise::new(settings.seed),
            settings,
            goals: default_goals(),
            agents,
            time: 0,
        })
    }

    pub fn settings(&self) -> &GoalSettings {
        &self.settings
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn agents(&self) -> &[GoalAgent] {
        &self.agents
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn set_settings(&mut self, settings: GoalSettings) -> ConfigResult<()> {
        validate(&settings)?;
        self.settings = settings;
        Ok(())
    }

    /// Utility of position `p` for an agent pursuing `objective`
    pub fn utility(&self, p: &Point2<f64>, objective: Objective) -> f64 {
        let mesa = self.settings.mesa_emergence;
        self.goals
            .iter()
            .map(|goal| {
                let weight = match (objective, goal.objective) {
                    (Objective::Base, Objective::Base) => 1.0,
                    (Objective::Mesa, Objective::Mesa) => 1.0 + mesa,
                    (Objective::Mesa, Objective::Base) => 1.0 - 0.5 * mesa,
                    (Objective::Instrumental, Objective::Instrumental) => 1.2,
                    _ => 0.0,
                };
                weight * goal.attraction(p)
            })
            .sum()
    }

    /// Forward-difference utility gradient
    pub fn gradient(&self, p: &Point2<f64>, objective: Objective) -> Vector2<f64> {
        let h = GOAL_GRADIENT_STEP;
        let u = self.utility(p, objective);
        let ux = self.utility(&(p + Vector2::new(h, 0.0)), objective);
        let uy = self.utility(&(p + Vector2::new(0.0, h)), objective);
        Vector2::new((ux - u) / h, (uy - u) / h)
    }
}

impl Simulator for GoalArena {
    type Metrics = GoalMetrics;

    fn step(&mut self) -> StepOutcome {
        let strength = self.settings.optimization_strength;
        let width = self.settings.noise_level * NOISE_GAIN;

        for i in 0..self.agents.len() {
            let (position, objective) = (self.agents[i].position, self.agents[i].objective);
            let force = self.gradient(&position, objective) * strength * FORCE_GAIN;
            let jitter = Vector2::new(self.noise.centered(width), self.noise.centered(width));

            let agent = &mut self.agents[i];
            let mut velocity = agent.velocity * GOAL_DAMPING + force + jitter;
            let speed = velocity.norm();
            if speed > GOAL_MAX_SPEED {
                velocity *= GOAL_MAX_SPEED / speed;
            }

            let mut next = position + velocity;
            let (lo_x, hi_x) = (ARENA_MARGIN, ARENA_WIDTH - ARENA_MARGIN);
            let (lo_y, hi_y) = (ARENA_MARGIN, ARENA_HEIGHT - ARENA_MARGIN);
            if next.x < lo_x || next.x > hi_x {
                velocity.x = -velocity.x;
                next.x = next.x.clamp(lo_x, hi_x);
            }
            if next.y < lo_y || next.y > hi_y {
                velocity.y = -velocity.y;
                next.y = next.y.clamp(lo_y, hi_y);
            }

            agent.trail.push_back(position);
            while agent.trail.len() > GOAL_TRAIL_LENGTH {
                agent.trail.pop_front();
            }
            agent.position = next;
            agent.velocity = velocity;
        }

        self.time += 1;
        StepOutcome::Advanced
    }

    fn metrics(&self) -> GoalMetrics {
        GoalMetrics {
            time: self.time,
            agents: self
                .agents
                .iter()
                .map(|a| AgentSnapshot {
                    objective: a.objective,
                    position: a.position,
                    speed: a.velocity.norm(),
                    utility: self.utility(&a.position, a.objective),
                })
                .collect(),
        }
    }

    fn reset(&mut self) {
        info!("Resetting goal arena");
        self.agents = spawn_agents(&mut self.noise);
        self.time = 0;
    }
}

fn spawn_agents(noise: &mut UniformNoise) -> Vec<GoalAgent> {
    (0..5)
        .map(|i| {
            let objective = match i {
                0..=2 => Objective::Base,
                3 => Objective::Mesa,
                _ => Objective::Instrumental,
            };
            let position = Point2::new(200.0 + 200.0 * noise.unit(), 200.0 + 200.0 * noise.unit());
            GoalAgent::new(objective, position)
        })
        .collect()
}

fn validate(settings: &GoalSettings) -> ConfigResult<()> {
    require_finite("optimization_strength", settings.optimization_strength)?;
    require_finite("mesa_emergence", settings.mesa_emergence)?;
    require_non_negative("noise_level", settings.noise_level)?;
    Ok(())
}
