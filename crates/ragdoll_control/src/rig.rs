//! Ragdoll body and joint layout
//!
//! A stick figure of ten bodies: torso, head, upper arms, forearms,
//! thighs, and calves, pinned together with revolute joints. Every fixture
//! shares one negative collision group so the limbs pass through each
//! other.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::ops::{Index, IndexMut};

use ragdoll_math::Vec2;
use ragdoll_physics::{
    BodyDesc, BodyKey, CollisionFilter, FixtureDesc, JointDesc, JointKey, PhysicsWorld, Shape,
};

/// Left or right limb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// One value per side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pair<T> {
    pub left: T,
    pub right: T,
}

impl<T> Pair<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Build both sides from a function of the side
    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        let left = f(Side::Left);
        let right = f(Side::Right);
        Self { left, right }
    }
}

impl<T> Index<Side> for Pair<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Side> for Pair<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

// Dimensions (world units)
const HIP_HEIGHT: f32 = 8.5;
const TORSO_LENGTH: f32 = 1.6;
const LIMB_WIDTH: f32 = 0.1;
const HEAD_RADIUS: f32 = 0.35;
/// Head center above the top of the torso
const HEAD_RAISE: f32 = 0.33;
const ARM_LENGTH: f32 = 0.7;
const LEG_LENGTH: f32 = 0.8;
const LEG_SPACING: f32 = 0.1;
/// Shoulders sit this far below the top of the torso
const SHOULDER_DROP: f32 = 0.2;

const HEAD_DENSITY: f32 = 0.1;
const UPPER_ARM_DENSITY: f32 = 0.7;
const FOREARM_DENSITY: f32 = 0.6;
const CALF_FRICTION: f32 = 0.2;

/// Handles to every body and joint of one ragdoll
#[derive(Debug, Clone, PartialEq)]
pub struct RagdollRig {
    pub torso: BodyKey,
    pub head: BodyKey,
    pub upper_arms: Pair<BodyKey>,
    pub forearms: Pair<BodyKey>,
    pub thighs: Pair<BodyKey>,
    pub calves: Pair<BodyKey>,
    pub neck: JointKey,
    pub shoulders: Pair<JointKey>,
    pub elbows: Pair<JointKey>,
    pub hips: Pair<JointKey>,
    pub knees: Pair<JointKey>,
}

impl RagdollRig {
    /// Build a ragdoll standing with its feet near `origin.y`
    ///
    /// Returns `None` only if the world refuses a joint between bodies it
    /// just created.
    pub fn build<W: PhysicsWorld>(world: &mut W, origin: Vec2, group: i32) -> Option<Self> {
        let filter = CollisionFilter::character(group);
        let at = |x: f32, y: f32| origin + Vec2::new(x, y);

        let torso_center = at(0.0, HIP_HEIGHT + TORSO_LENGTH / 2.0);
        let torso_top = HIP_HEIGHT + TORSO_LENGTH;
        let shoulder_y = torso_top - SHOULDER_DROP;
        let thigh_y = HIP_HEIGHT - LEG_LENGTH / 2.0;
        let knee_y = HIP_HEIGHT - LEG_LENGTH;
        let calf_y = knee_y - LEG_LENGTH / 2.0;

        let torso = create_limb(
            world,
            torso_center,
            0.0,
            Shape::rect(LIMB_WIDTH / 2.0, TORSO_LENGTH / 2.0),
            1.0,
            None,
            filter,
        );
        let head = world.create_body(BodyDesc::dynamic(at(0.0, torso_top + HEAD_RAISE)));
        world.create_fixture(
            head,
            FixtureDesc::new(Shape::circle(HEAD_RADIUS))
                .with_density(HEAD_DENSITY)
                .with_filter(filter),
        );

        let arm_shape = Shape::rect(ARM_LENGTH / 2.0, LIMB_WIDTH / 2.0);
        let leg_shape = Shape::rect(LEG_LENGTH / 2.0, LIMB_WIDTH / 2.0);
        let shoulder_x = LIMB_WIDTH / 2.0;

        let upper_arms = Pair::from_fn(|side| {
            let x = side.sign() * (shoulder_x + ARM_LENGTH / 2.0);
            create_limb(world, at(x, shoulder_y), PI, arm_shape.clone(), UPPER_ARM_DENSITY, None, filter)
        });
        let forearms = Pair::from_fn(|side| {
            let x = side.sign() * (shoulder_x + ARM_LENGTH * 1.5);
            create_limb(world, at(x, shoulder_y), PI, arm_shape.clone(), FOREARM_DENSITY, None, filter)
        });
        let thighs = Pair::from_fn(|side| {
            let x = side.sign() * LEG_SPACING / 2.0;
            create_limb(world, at(x, thigh_y), FRAC_PI_2, leg_shape.clone(), 1.0, None, filter)
        });
        let calves = Pair::from_fn(|side| {
            let x = side.sign() * LEG_SPACING / 2.0;
            create_limb(
                world,
                at(x, calf_y),
                FRAC_PI_2,
                leg_shape.clone(),
                1.0,
                Some(CALF_FRICTION),
                filter,
            )
        });

        let neck = world.create_joint(
            JointDesc::revolute(torso, head, at(0.0, torso_top + 0.01)).with_limits(-FRAC_PI_4, FRAC_PI_4),
        )?;

        let mut pin = |a: BodyKey, b: BodyKey, anchor: Vec2| world.create_joint(JointDesc::revolute(a, b, anchor));
        let shoulders = Pair::new(
            pin(torso, upper_arms.left, at(-shoulder_x, shoulder_y))?,
            pin(torso, upper_arms.right, at(shoulder_x, shoulder_y))?,
        );
        let elbow_x = shoulder_x + ARM_LENGTH;
        let elbows = Pair::new(
            pin(upper_arms.left, forearms.left, at(-elbow_x, shoulder_y))?,
            pin(upper_arms.right, forearms.right, at(elbow_x, shoulder_y))?,
        );
        let leg_x = LEG_SPACING / 2.0;
        let hips = Pair::new(
            pin(torso, thighs.left, at(-leg_x, HIP_HEIGHT))?,
            pin(torso, thighs.right, at(leg_x, HIP_HEIGHT))?,
        );
        let knees = Pair::new(
            pin(thighs.left, calves.left, at(-leg_x, knee_y))?,
            pin(thighs.right, calves.right, at(leg_x, knee_y))?,
        );

        Some(Self {
            torso,
            head,
            upper_arms,
            forearms,
            thighs,
            calves,
            neck,
            shoulders,
            elbows,
            hips,
            knees,
        })
    }

    /// Every body of the rig
    pub fn bodies(&self) -> [BodyKey; 10] {
        [
            self.torso,
            self.head,
            self.upper_arms.left,
            self.upper_arms.right,
            self.forearms.left,
            self.forearms.right,
            self.thighs.left,
            self.thighs.right,
            self.calves.left,
            self.calves.right,
        ]
    }

    /// Every joint of the rig
    pub fn joints(&self) -> [JointKey; 9] {
        [
            self.neck,
            self.shoulders.left,
            self.shoulders.right,
            self.elbows.left,
            self.elbows.right,
            self.hips.left,
            self.hips.right,
            self.knees.left,
            self.knees.right,
        ]
    }

    /// The body that grabs things
    pub fn hand(&self) -> BodyKey {
        self.forearms.right
    }

    /// Destroy every body, which also destroys every joint attached to them
    pub fn destroy<W: PhysicsWorld>(&self, world: &mut W) {
        for body in self.bodies() {
            world.destroy_body(body);
        }
    }
}

fn create_limb<W: PhysicsWorld>(
    world: &mut W,
    position: Vec2,
    angle: f32,
    shape: Shape,
    density: f32,
    friction: Option<f32>,
    filter: CollisionFilter,
) -> BodyKey {
    let body = world.create_body(BodyDesc::dynamic(position).with_angle(angle));
    let mut fixture = FixtureDesc::new(shape).with_density(density).with_filter(filter);
    if let Some(friction) = friction {
        fixture = fixture.with_friction(friction);
    }
    world.create_fixture(body, fixture);
    body
}
