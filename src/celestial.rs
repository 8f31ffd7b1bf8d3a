use bevy::light::{CascadeShadowConfigBuilder, light_consts::lux};
use bevy::prelude::*;

/// Where the sun sits; it always shines toward the world origin
const SUN_POSITION: Vec3 = Vec3::new(10.0, 20.0, 10.0);

/// Sky behind the terrain
const SKY_COLOR: Color = Color::srgb(0.2, 0.3, 0.3);

/// Marker component for the sun light source
#[derive(Component)]
pub struct Sun;

/// Lighting parameters for the static scene
#[derive(Resource)]
pub struct CelestialSettings {
    pub sun_illuminance: f32,
    /// Fill light so faces turned away from the sun stay readable
    pub ambient_brightness: f32,
}

impl Default for CelestialSettings {
    fn default() -> Self {
        Self {
            sun_illuminance: lux::AMBIENT_DAYLIGHT,
            ambient_brightness: 400.0,
        }
    }
}

pub struct CelestialPlugin;

impl Plugin for CelestialPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(SKY_COLOR))
            .init_resource::<CelestialSettings>()
            .add_systems(Startup, setup_sun)
            .add_systems(Update, attach_ambient_light);
    }
}

fn setup_sun(mut commands: Commands, settings: Res<CelestialSettings>) {
    let cascade_shadow_config = CascadeShadowConfigBuilder {
        first_cascade_far_bound: 20.0,
        maximum_distance: 150.0,
        ..default()
    }
    .build();

    commands.spawn((
        DirectionalLight {
            illuminance: settings.sun_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        cascade_shadow_config,
        Sun,
    ));
}

/// Gives every new 3D camera the same neutral fill light
fn attach_ambient_light(
    mut commands: Commands,
    cameras: Query<Entity, Added<Camera3d>>,
    settings: Res<CelestialSettings>,
) {
    for camera in &cameras {
        commands.entity(camera).insert(AmbientLight {
            color: Color::WHITE,
            brightness: settings.ambient_brightness,
            affects_lightmapped_meshes: true,
        });
    }
}
