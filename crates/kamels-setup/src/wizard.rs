//! The setup sequence.
//!
//! Each step runs only if its setting is still unset, so a partially
//! configured installation is asked only the missing questions.  Steps are
//! numbered in the order they are actually asked.
//!
//! | Step | Setting                    | Answer                                |
//! |------|----------------------------|---------------------------------------|
//! | 1    | `mouseDevice`              | pick from the device table            |
//! | 2    | `keyboardDevice`           | pick from the device table            |
//! | 3    | `totalHostDevices`         | 2-4                                   |
//! | 4    | `hostDeviceSequenceNumber` | 1-total                               |
//! | 5    | `syncMode`                 | 1-4                                   |
//! | 6    | `switchSpeedRate`          | asked only if a peripheral is Bluetooth |
//!
//! Settings are saved after every answered step.  Picking a device also
//! stores its full identity in the device cache, which lets the switcher find
//! a Bluetooth peripheral that is paired to another host at startup.

use kamels_core::{
    first_matching_interface, DeviceIdentity, PeripheralRole, SwitchSpeed, SyncMode,
    TransportKind, LOGITECH_VENDOR_ID, MAX_HOSTS, MIN_HOSTS,
};
use kamels_switch::infrastructure::storage::device_cache::{DeviceCache, DeviceCacheStore};
use kamels_switch::infrastructure::storage::settings::{Settings, SettingsStore};
use kamels_switch::infrastructure::storage::StorageError;
use kamels_switch::infrastructure::transport::{HidTransport, TransportError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::prompt::{request_number, PromptError, Prompter};
use crate::table::render_device_table;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No allow-listed Logitech interface is connected.
    #[error("no Logitech receiver or Bluetooth device found to use as the {role}")]
    NoDevices { role: PeripheralRole },
}

/// What a finished setup session did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOutcome {
    /// `true` if at least one question was asked or answered automatically.
    pub changed: bool,
    /// The settings as saved.
    pub settings: Settings,
}

/// Runs the setup steps against a transport, two stores, and a console.
pub struct SetupWizard<'a> {
    transport: &'a dyn HidTransport,
    settings_store: &'a SettingsStore,
    cache_store: &'a DeviceCacheStore,
    prompter: &'a mut dyn Prompter,
    step: u16,
}

impl<'a> SetupWizard<'a> {
    pub fn new(
        transport: &'a dyn HidTransport,
        settings_store: &'a SettingsStore,
        cache_store: &'a DeviceCacheStore,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            transport,
            settings_store,
            cache_store,
            prompter,
            step: 0,
        }
    }

    /// Runs every step that is still needed, then prints the instructions.
    ///
    /// # Errors
    ///
    /// Returns the first prompt, storage, or transport error.  Answers given
    /// before the error are already saved.
    pub fn run(&mut self) -> Result<SetupOutcome, SetupError> {
        let mut settings = self.settings_store.load()?;
        for key in settings.clear_invalid() {
            warn!(
                "{key} in {} is out of range, asking again",
                self.settings_store.path().display()
            );
        }
        let mut cache = self.cache_store.load().unwrap_or_else(|e| {
            warn!("starting with an empty device cache: {e}");
            DeviceCache::default()
        });

        for role in PeripheralRole::ALL {
            self.device_step(role, &mut settings, &mut cache)?;
        }
        self.rotation_steps(&mut settings)?;
        self.sync_mode_step(&mut settings)?;
        self.speed_step(&mut settings, &cache)?;

        let changed = self.step > 0;
        if changed {
            self.instructions(&settings)?;
        } else {
            info!("settings are complete, nothing to do");
        }
        Ok(SetupOutcome { changed, settings })
    }

    /// Starts a numbered step, printing the introduction before the first.
    fn begin_step(&mut self) -> Result<u16, SetupError> {
        if self.step == 0 {
            self.intro()?;
        }
        self.step += 1;
        Ok(self.step)
    }

    fn intro(&mut self) -> Result<(), SetupError> {
        self.prompter.say(&format!(
            "KAMELS - Keyboard And Mouse Enumerative Logitech Switch, version {}\n",
            env!("CARGO_PKG_VERSION")
        ))?;
        self.prompter.say(
            "This is a small program to help keep your multi-host Logitech mouse and keyboard in sync.\n\n\
             This software is not affiliated in any way with Logitech. Please use at your own risk.\n\n\
             Some setup is necessary to get you going, so please follow the instructions below.",
        )?;
        Ok(())
    }

    fn device_step(
        &mut self,
        role: PeripheralRole,
        settings: &mut Settings,
        cache: &mut DeviceCache,
    ) -> Result<(), SetupError> {
        let current = match role {
            PeripheralRole::Mouse => settings.mouse_device,
            PeripheralRole::Keyboard => settings.keyboard_device,
        };
        if current != 0 {
            return Ok(());
        }

        let step = self.begin_step()?;
        self.prompter.say(&format!(
            "\n{step}. Please select the interface your {} is connected to:\n",
            role.to_string().to_uppercase()
        ))?;

        let devices: Vec<DeviceIdentity> = self
            .transport
            .enumerate(Some(LOGITECH_VENDOR_ID), None)?
            .into_iter()
            .filter(DeviceIdentity::is_allowed_interface)
            .collect();
        if devices.is_empty() {
            return Err(SetupError::NoDevices { role });
        }
        self.prompter.say(&render_device_table(&devices))?;

        let index = if devices.len() == 1 {
            0
        } else {
            let count = devices.len() as u16;
            let answer = request_number(
                &mut *self.prompter,
                &format!("Please type a number (1-{count}) and press 'Enter': "),
                1..=count,
            )?;
            usize::from(answer - 1)
        };
        let chosen = devices[index].clone();
        info!("{role}: product {} over {}", chosen.product_id, chosen.transport);

        match role {
            PeripheralRole::Mouse => settings.mouse_device = chosen.product_id,
            PeripheralRole::Keyboard => settings.keyboard_device = chosen.product_id,
        }
        cache.set(role, chosen);
        self.cache_store.save(cache)?;
        self.settings_store.save(settings)?;
        Ok(())
    }

    fn rotation_steps(&mut self, settings: &mut Settings) -> Result<(), SetupError> {
        if settings.total_host_devices == 0 {
            let step = self.begin_step()?;
            settings.total_host_devices = request_number(
                &mut *self.prompter,
                &format!(
                    "\n{step}. Please type the number of computers you will switch between and press 'Enter': "
                ),
                MIN_HOSTS..=MAX_HOSTS,
            )?;
            self.settings_store.save(settings)?;
        }

        if settings.host_device_sequence_number == 0 {
            let step = self.begin_step()?;
            let total = settings.total_host_devices;
            settings.host_device_sequence_number = request_number(
                &mut *self.prompter,
                &format!(
                    "\n{step}. Please type the position of THIS computer in your switch sequence of {total} computers and press 'Enter': "
                ),
                1..=total,
            )?;
            self.settings_store.save(settings)?;
        }
        Ok(())
    }

    fn sync_mode_step(&mut self, settings: &mut Settings) -> Result<(), SetupError> {
        if settings.sync_mode != 0 {
            return Ok(());
        }
        let step = self.begin_step()?;
        let mut prompt = format!("\n{step}. Please select the switch mode you would like to use:\n\n");
        for mode in SyncMode::ALL {
            prompt.push_str(&format!("\t{}. {}\n", mode.code(), mode.description()));
        }
        prompt.push_str("\n... type in the number of your choice, and press 'Enter': ");

        settings.sync_mode = request_number(&mut *self.prompter, &prompt, 1..=4)?;
        self.settings_store.save(settings)?;
        Ok(())
    }

    fn speed_step(&mut self, settings: &mut Settings, cache: &DeviceCache) -> Result<(), SetupError> {
        if settings.switch_speed_rate != SwitchSpeed::None {
            return Ok(());
        }

        let looping = SyncMode::from_code(settings.sync_mode).is_some_and(|mode| !mode.is_one_shot());
        settings.switch_speed_rate = if looping && self.any_wireless(settings, cache) {
            self.ask_speed()?
        } else {
            debug!("no Bluetooth peripheral, using {}", SwitchSpeed::DEFAULT);
            SwitchSpeed::DEFAULT
        };
        self.settings_store.save(settings)?;
        Ok(())
    }

    /// `true` if either configured peripheral is Bluetooth, judged live first
    /// and from the cache otherwise.
    fn any_wireless(&self, settings: &Settings, cache: &DeviceCache) -> bool {
        PeripheralRole::ALL.into_iter().any(|role| {
            let product_id = match role {
                PeripheralRole::Mouse => settings.mouse_device,
                PeripheralRole::Keyboard => settings.keyboard_device,
            };
            let live = self
                .transport
                .enumerate(Some(LOGITECH_VENDOR_ID), Some(product_id))
                .ok()
                .and_then(|found| first_matching_interface(found, product_id));
            let transport = live
                .map(|identity| identity.transport)
                .or_else(|| {
                    cache
                        .get(role)
                        .filter(|cached| cached.product_id == product_id)
                        .map(|cached| cached.transport)
                });
            transport == Some(TransportKind::Wireless)
        })
    }

    fn ask_speed(&mut self) -> Result<SwitchSpeed, SetupError> {
        let step = self.begin_step()?;
        let mut choices = vec![SwitchSpeed::DEFAULT];
        choices.extend(
            SwitchSpeed::CONFIGURED
                .into_iter()
                .filter(|&speed| speed != SwitchSpeed::DEFAULT),
        );

        let mut prompt = format!(
            "\n{step}. A Bluetooth peripheral cannot announce that it switched host, so the \
             switcher checks its connection periodically.\n\n\
             A shorter check period uses more CPU. On modern computers the default \"{}\" has no \
             noticeable impact; choose a longer period if you do not switch rapidly.\n\n\
             Please select the check period you would like to use:\n\n",
            SwitchSpeed::DEFAULT
        );
        for (i, speed) in choices.iter().enumerate() {
            prompt.push_str(&format!(
                "\t{}. {speed} - less than {} seconds{}\n",
                i + 1,
                speed.millis() as f64 / 1000.0,
                if i == 0 { " (DEFAULT)" } else { "" }
            ));
        }
        prompt.push_str("\n... type in the number of your choice, and press 'Enter': ");

        let answer = request_number(&mut *self.prompter, &prompt, 1..=choices.len() as u16)?;
        Ok(choices[usize::from(answer - 1)])
    }

    fn instructions(&mut self, settings: &Settings) -> Result<(), SetupError> {
        self.prompter.say("\nINSTRUCTIONS:\n")?;
        self.prompter.say(&format!(
            "Set this program up with sync mode {} on all your computers, each with its own \
             position out of the same total of {} computers.\n",
            settings.sync_mode, settings.total_host_devices
        ))?;
        let usage = match SyncMode::from_code(settings.sync_mode) {
            Some(mode) if mode.is_one_shot() => {
                "Map a keyboard key to run kamels-switch on every computer. On Windows and macOS \
                 you can use Logi Options+."
            }
            _ => "Run kamels-switch in the background on every computer.",
        };
        self.prompter.say(usage)?;
        Ok(())
    }
}
